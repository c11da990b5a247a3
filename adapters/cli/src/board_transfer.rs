use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine as _};
use hexburst_core::{AxialCoord, GridExtent, HexLayout, Piece, PieceColor, PieceId, PieceKind};
use hexburst_world::Grid;
use serde::{Deserialize, Serialize};
use thiserror::Error;

const SNAPSHOT_DOMAIN: &str = "hexburst";
const SNAPSHOT_VERSION: &str = "v1";

/// Identifier prefix emitted before the encoded snapshot payload.
pub(crate) const SNAPSHOT_HEADER: &str = "hexburst:v1";
const FIELD_DELIMITER: char = ':';

/// Largest `max_q` or `max_r` a snapshot may declare.
pub(crate) const MAX_SNAPSHOT_EXTENT: i32 = 64;

/// Shareable picture of the board: its extent and every placed piece.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub(crate) struct BoardSnapshot {
    /// Largest legal absolute `q`.
    pub(crate) max_q: i32,
    /// Largest legal absolute `r`.
    pub(crate) max_r: i32,
    /// Placed pieces in grid order.
    pub(crate) pieces: Vec<SnapshotPiece>,
}

/// A placed piece captured in a snapshot.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub(crate) struct SnapshotPiece {
    pub(crate) cell: AxialCoord,
    pub(crate) kind: PieceKind,
    pub(crate) color: PieceColor,
}

impl BoardSnapshot {
    /// Captures every placed piece of `grid`.
    #[must_use]
    pub(crate) fn capture(grid: &Grid) -> Self {
        Self {
            max_q: grid.extent().max_q(),
            max_r: grid.extent().max_r(),
            pieces: grid
                .all_occupants()
                .map(|(cell, piece)| SnapshotPiece {
                    cell,
                    kind: piece.kind(),
                    color: piece.color(),
                })
                .collect(),
        }
    }

    /// Rebuilds a grid holding the captured pieces.
    #[must_use]
    pub(crate) fn restore(&self, layout: HexLayout) -> Grid {
        let mut grid = Grid::new(self.extent(), layout);
        for (index, captured) in self.pieces.iter().enumerate() {
            let piece = Piece::new(PieceId::new(index as u32), captured.kind, captured.color);
            if grid.place(captured.cell, piece).is_err() {
                log::warn!("snapshot piece at {} is outside the grid", captured.cell);
            }
        }
        grid
    }

    /// Extent the snapshot was taken on.
    #[must_use]
    pub(crate) fn extent(&self) -> GridExtent {
        GridExtent::new(self.max_q, self.max_r)
    }

    /// Encodes the snapshot into a single line that can be pasted back later.
    pub(crate) fn encode(&self) -> Result<String, BoardTransferError> {
        let json = serde_json::to_vec(&self.pieces).map_err(BoardTransferError::InvalidPayload)?;
        let encoded = STANDARD_NO_PAD.encode(json);
        Ok(format!(
            "{SNAPSHOT_HEADER}:{}x{}:{encoded}",
            self.max_q, self.max_r
        ))
    }

    /// Decodes a snapshot produced by [`BoardSnapshot::encode`].
    pub(crate) fn decode(value: &str) -> Result<Self, BoardTransferError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(BoardTransferError::EmptyPayload);
        }

        let mut parts = trimmed.split(FIELD_DELIMITER);
        let domain = parts.next().ok_or(BoardTransferError::MissingPrefix)?;
        let version = parts.next().ok_or(BoardTransferError::MissingVersion)?;
        let extent = parts.next().ok_or(BoardTransferError::MissingExtent)?;
        let payload = parts.next().ok_or(BoardTransferError::MissingPayload)?;

        if domain != SNAPSHOT_DOMAIN {
            return Err(BoardTransferError::InvalidPrefix(domain.to_owned()));
        }
        if version != SNAPSHOT_VERSION {
            return Err(BoardTransferError::UnsupportedVersion(version.to_owned()));
        }

        let (max_q, max_r) = parse_extent(extent)?;
        let bytes = STANDARD_NO_PAD
            .decode(payload.as_bytes())
            .map_err(BoardTransferError::InvalidEncoding)?;
        let pieces: Vec<SnapshotPiece> =
            serde_json::from_slice(&bytes).map_err(BoardTransferError::InvalidPayload)?;

        let snapshot = Self {
            max_q,
            max_r,
            pieces,
        };
        let extent = snapshot.extent();
        if let Some(piece) = snapshot.pieces.iter().find(|piece| !extent.contains(piece.cell)) {
            return Err(BoardTransferError::PieceOutsideExtent(piece.cell));
        }
        Ok(snapshot)
    }
}

/// Errors that can occur while decoding board snapshot strings.
#[derive(Debug, Error)]
pub(crate) enum BoardTransferError {
    #[error("snapshot string was empty")]
    EmptyPayload,
    #[error("snapshot string is missing the prefix")]
    MissingPrefix,
    #[error("snapshot string is missing the version")]
    MissingVersion,
    #[error("snapshot string is missing the grid extent")]
    MissingExtent,
    #[error("snapshot string is missing the payload")]
    MissingPayload,
    #[error("snapshot prefix '{0}' is not supported")]
    InvalidPrefix(String),
    #[error("snapshot version '{0}' is not supported")]
    UnsupportedVersion(String),
    #[error("could not parse grid extent '{0}'")]
    InvalidExtent(String),
    #[error(
        "grid extent {max_q}x{max_r} exceeds the limit of {limit}",
        limit = MAX_SNAPSHOT_EXTENT
    )]
    ExtentTooLarge { max_q: i32, max_r: i32 },
    #[error("snapshot places a piece outside the grid at {0}")]
    PieceOutsideExtent(AxialCoord),
    #[error("could not decode snapshot payload: {0}")]
    InvalidEncoding(#[source] base64::DecodeError),
    #[error("could not parse snapshot payload: {0}")]
    InvalidPayload(#[source] serde_json::Error),
}

fn parse_extent(extent: &str) -> Result<(i32, i32), BoardTransferError> {
    let invalid = || BoardTransferError::InvalidExtent(extent.to_owned());
    let (max_q, max_r) = extent.split_once(['x', 'X']).ok_or_else(invalid)?;
    let max_q = max_q.trim().parse::<i32>().map_err(|_| invalid())?;
    let max_r = max_r.trim().parse::<i32>().map_err(|_| invalid())?;
    if max_q < 0 || max_r < 0 {
        return Err(invalid());
    }
    if max_q > MAX_SNAPSHOT_EXTENT || max_r > MAX_SNAPSHOT_EXTENT {
        return Err(BoardTransferError::ExtentTooLarge { max_q, max_r });
    }
    Ok((max_q, max_r))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn populated_board_survives_transfer() {
        let snapshot = BoardSnapshot {
            max_q: 6,
            max_r: 4,
            pieces: vec![
                SnapshotPiece {
                    cell: AxialCoord::new(-2, 4),
                    kind: PieceKind::Fairy,
                    color: PieceColor::Blue,
                },
                SnapshotPiece {
                    cell: AxialCoord::new(3, -1),
                    kind: PieceKind::Bomb,
                    color: PieceColor::Yellow,
                },
            ],
        };

        let encoded = snapshot.encode().expect("snapshot encodes");
        assert!(encoded.starts_with(&format!("{SNAPSHOT_HEADER}:6x4:")));
        let decoded = BoardSnapshot::decode(&encoded).expect("snapshot decodes");
        assert_eq!(snapshot, decoded);
    }

    #[test]
    fn captured_grid_restores_identically() {
        let mut grid = Grid::new(GridExtent::new(3, 3), HexLayout::default());
        let placements = [
            (AxialCoord::new(0, 3), PieceKind::Normal, PieceColor::Red),
            (AxialCoord::new(1, 2), PieceKind::LargeBomb, PieceColor::Red),
            (AxialCoord::new(-3, 0), PieceKind::Fairy, PieceColor::Yellow),
        ];
        for (index, (cell, kind, color)) in placements.into_iter().enumerate() {
            let piece = Piece::new(PieceId::new(index as u32), kind, color);
            assert!(grid.place(cell, piece).is_ok());
        }

        let snapshot = BoardSnapshot::capture(&grid);
        let restored = snapshot.restore(HexLayout::default());

        assert_eq!(restored.len(), 3);
        assert_eq!(BoardSnapshot::capture(&restored), snapshot);
    }

    #[test]
    fn foreign_prefix_is_rejected() {
        let error = BoardSnapshot::decode("puzzle:v1:3x3:W10").expect_err("prefix rejected");
        assert!(matches!(error, BoardTransferError::InvalidPrefix(prefix) if prefix == "puzzle"));
    }

    #[test]
    fn pieces_outside_the_extent_are_rejected() {
        let snapshot = BoardSnapshot {
            max_q: 6,
            max_r: 6,
            pieces: vec![SnapshotPiece {
                cell: AxialCoord::new(5, 5),
                kind: PieceKind::Normal,
                color: PieceColor::Red,
            }],
        };
        let encoded = snapshot.encode().expect("snapshot encodes");
        let shrunk = encoded.replacen("6x6", "2x2", 1);

        assert!(matches!(
            BoardSnapshot::decode(&shrunk),
            Err(BoardTransferError::PieceOutsideExtent(cell)) if cell == AxialCoord::new(5, 5)
        ));
    }

    #[test]
    fn oversized_extent_is_rejected() {
        assert!(matches!(
            BoardSnapshot::decode("hexburst:v1:1000000000x0:W10"),
            Err(BoardTransferError::ExtentTooLarge {
                max_q: 1_000_000_000,
                max_r: 0
            })
        ));
        let limit = format!("hexburst:v1:{MAX_SNAPSHOT_EXTENT}x{MAX_SNAPSHOT_EXTENT}:W10");
        let snapshot = BoardSnapshot::decode(&limit).expect("limit is accepted");
        assert!(snapshot.pieces.is_empty());
    }

    #[test]
    fn malformed_extent_is_rejected() {
        assert!(matches!(
            BoardSnapshot::decode("hexburst:v1:six:W10"),
            Err(BoardTransferError::InvalidExtent(_))
        ));
    }
}

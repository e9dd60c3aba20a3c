use crate::geo::distance::distance_km;
use crate::types::position::Position;
use serde::Serialize;

/// One reconstructed trajectory: positions in strictly increasing hour order.
///
/// Built only by the reconstructor and read-only afterwards; never empty.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FlightPath {
    positions: Vec<Position>,
}

impl FlightPath {
    pub(crate) fn from_seed(seed: Position) -> Self {
        Self {
            positions: vec![seed],
        }
    }

    pub(crate) fn push(&mut self, position: Position) {
        debug_assert!(self.last().hour < position.hour);
        self.positions.push(position);
    }

    pub fn positions(&self) -> &[Position] {
        &self.positions
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn first(&self) -> &Position {
        &self.positions[0]
    }

    pub fn last(&self) -> &Position {
        &self.positions[self.positions.len() - 1]
    }

    /// Hour offsets visited by the path, in order.
    pub fn hours(&self) -> impl Iterator<Item = u8> + '_ {
        self.positions.iter().map(|p| p.hour)
    }

    /// Sum of the great-circle legs between consecutive positions.
    pub fn length_km(&self) -> f64 {
        self.positions
            .windows(2)
            .map(|pair| distance_km(pair[0].lat_lon(), pair[1].lat_lon()))
            .sum()
    }
}

use serde::{Deserialize, Serialize};

/// Viewport-space rectangle as reported by the embedding page.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Measured rectangle of one matching card, tagged with the pair it
/// renders.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnchorRect {
    pub pair_id: i64,
    #[serde(flatten)]
    pub rect: Rect,
}

/// Line endpoints in container-local coordinates, ready to hand to an
/// SVG overlay positioned at the container origin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectorLine {
    pub left_pair_id: i64,
    pub right_pair_id: i64,
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

/// Compute one connector per established match: from the midpoint of
/// the left card's right edge to the midpoint of the right card's left
/// edge, translated into the container's coordinate space. Pairs whose
/// cards were not measured (collapsed row, mid-layout call) are skipped
/// rather than drawn at a guessed position.
pub fn connector_lines(
    container: &Rect,
    left_anchors: &[AnchorRect],
    right_anchors: &[AnchorRect],
    pairs: &[(i64, i64)],
) -> Vec<ConnectorLine> {
    pairs
        .iter()
        .filter_map(|&(left_pair_id, right_pair_id)| {
            let left = left_anchors.iter().find(|a| a.pair_id == left_pair_id)?;
            let right = right_anchors.iter().find(|a| a.pair_id == right_pair_id)?;
            Some(ConnectorLine {
                left_pair_id,
                right_pair_id,
                x1: left.rect.x + left.rect.width - container.x,
                y1: left.rect.y + left.rect.height / 2.0 - container.y,
                x2: right.rect.x - container.x,
                y2: right.rect.y + right.rect.height / 2.0 - container.y,
            })
        })
        .collect()
}

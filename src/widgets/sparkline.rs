//! Inline SVG sparkline

use crate::dom::{Element, Node};

const WIDTH: f64 = 120.0;
const HEIGHT: f64 = 32.0;
const PADDING: f64 = 2.0;

/// Polyline of `values` (oldest first). Fewer than two points can't form a
/// line, so an explicit placeholder is rendered instead.
pub fn sparkline(values: &[f64], stroke: &str) -> Node {
    let values: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if values.len() < 2 {
        return Element::new("span")
            .class("sparkline sparkline-empty")
            .text("No history yet")
            .into();
    }

    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let range = max - min;
    let step = (WIDTH - 2.0 * PADDING) / (values.len() - 1) as f64;
    let usable = HEIGHT - 2.0 * PADDING;

    let points: Vec<String> = values
        .iter()
        .enumerate()
        .map(|(i, v)| {
            let x = PADDING + step * i as f64;
            // Flat series sits on the middle line
            let y = if range == 0.0 {
                HEIGHT / 2.0
            } else {
                PADDING + usable * (1.0 - (v - min) / range)
            };
            format!("{:.1},{:.1}", x, y)
        })
        .collect();

    Element::new("svg")
        .class("sparkline")
        .attr("viewBox", format!("0 0 {} {}", WIDTH, HEIGHT))
        .attr("width", WIDTH.to_string())
        .attr("height", HEIGHT.to_string())
        .attr("aria-hidden", "true")
        .child(
            Element::new("polyline")
                .attr("fill", "none")
                .attr("stroke", stroke)
                .attr("stroke-width", "1.5")
                .attr("points", points.join(" ")),
        )
        .into()
}

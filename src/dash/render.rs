//! The two views of the dashboard. Both only read a `DashboardView`.

use adoption_model::buckets::adoption_color;
use adoption_model::round_pct;
use adoption_model::view::{DashboardView, CARD_COLUMNS};

use serde_json::json;
use serde_json::Map as JSMap;
use serde_json::Value as JSValue;

use crate::dash::*;

const CARD_WIDTH: usize = 30;

pub trait Renderer {
    fn render(&self, view: &DashboardView) -> DashResult<String>;
}

/// The dashboard as text, with a grid of cards.
pub struct CardsRenderer;

/// The JSON summary of the dashboard.
pub struct JsonRenderer {
    /// Name of the input file, reported in the summary.
    pub source: String,
}

pub fn make_renderer(view_name: &str, source: &str) -> DashResult<Box<dyn Renderer>> {
    match view_name {
        "cards" => Ok(Box::new(CardsRenderer)),
        "json" => Ok(Box::new(JsonRenderer {
            source: source.to_string(),
        })),
        x => UnknownViewSnafu { view: x }.fail(),
    }
}

fn mode_label(mode: Mode) -> &'static str {
    match mode {
        Mode::Actual => "actual values",
        Mode::WhatIf => "what-if simulation",
    }
}

impl CardsRenderer {
    fn card_lines(view: &DashboardView, idx: usize) -> Vec<String> {
        let card = &view.cards[idx];
        let mut lines = vec![
            card.id.clone(),
            format!("{}: {}%", card.gauge.title, card.adoption_pct),
            format!("Active Users: {} / {}", card.active_users, card.total_users),
            format!("Bucket: {}", card.bucket.name()),
        ];
        if let Some(input) = &card.input {
            lines.push(format!("Set to: {} [{}-{}]", input.value, input.min, input.max));
        }
        lines
    }
}

impl Renderer for CardsRenderer {
    fn render(&self, view: &DashboardView) -> DashResult<String> {
        let mut out: Vec<String> = Vec::new();
        out.push(view.title.clone());
        out.push(format!("Mode: {}", mode_label(view.mode)));
        out.push(format!(
            "{}: {}% ({}) - {} / {} users",
            view.global.title,
            round_pct(view.global.value),
            view.global.bar_color,
            view.total_active_users,
            view.total_users
        ));
        out.push("".to_string());

        let vp = view.map.viewport;
        out.push(format!(
            "Map centered on ({}, {}) at zoom {}, {} sites",
            vp.latitude,
            vp.longitude,
            vp.zoom,
            view.map.markers.len()
        ));
        for m in view.map.markers.iter() {
            out.push(format!(
                "  {:<24} ({:>8.3}, {:>9.3}) radius {} m",
                m.id, m.latitude, m.longitude, m.radius
            ));
        }
        out.push("".to_string());

        let indexes: Vec<usize> = (0..view.cards.len()).collect();
        for row in indexes.chunks(CARD_COLUMNS) {
            let cards: Vec<Vec<String>> = row
                .iter()
                .map(|idx| CardsRenderer::card_lines(view, *idx))
                .collect();
            let height = cards.iter().map(|c| c.len()).max().unwrap_or(0);
            for l in 0..height {
                let cells: Vec<String> = cards
                    .iter()
                    .map(|c| {
                        let s = c.get(l).map(|s| s.as_str()).unwrap_or("");
                        format!("| {:<width$} ", s, width = CARD_WIDTH)
                    })
                    .collect();
                out.push(format!("{}|", cells.concat()).trim_end().to_string());
            }
            out.push("".to_string());
        }
        out.push(view.caption.clone());
        Ok(out.join("\n"))
    }
}

/// Assembles the JSON summary of a dashboard.
///
/// Rates are rounded to one decimal. The simulated input of a site is only
/// present in what-if mode.
pub fn build_summary_js(view: &DashboardView, source: &str) -> JSValue {
    let vp = view.map.viewport;
    let markers: Vec<JSValue> = view
        .map
        .markers
        .iter()
        .map(|m| {
            json!({
                "site": m.id,
                "latitude": m.latitude,
                "longitude": m.longitude,
                "radius": m.radius,
                "fill": m.fill,
            })
        })
        .collect();

    let mut sites: Vec<JSValue> = Vec::new();
    for card in view.cards.iter() {
        let mut site: JSMap<String, JSValue> = JSMap::new();
        site.insert("site".to_string(), json!(card.id));
        site.insert("activeUsers".to_string(), json!(card.active_users));
        site.insert("totalUsers".to_string(), json!(card.total_users));
        site.insert("adoptionPct".to_string(), json!(card.adoption_pct));
        site.insert("color".to_string(), json!(card.bucket.color()));
        if let Some(input) = &card.input {
            site.insert(
                "input".to_string(),
                json!({"min": input.min, "max": input.max, "value": input.value}),
            );
        }
        sites.push(JSValue::Object(site));
    }

    json!({
        "config": {
            "title": view.title,
            "source": source,
        },
        "mode": view.mode.as_str(),
        "global": {
            "adoptionPct": round_pct(view.global.value),
            "color": adoption_color(view.global.value),
            "activeUsers": view.total_active_users,
            "totalUsers": view.total_users,
        },
        "map": {
            "viewport": {
                "latitude": vp.latitude,
                "longitude": vp.longitude,
                "zoom": vp.zoom,
                "minZoom": vp.min_zoom,
                "maxZoom": vp.max_zoom,
                "pitch": vp.pitch,
            },
            "markers": markers,
        },
        "sites": sites,
    })
}

impl Renderer for JsonRenderer {
    fn render(&self, view: &DashboardView) -> DashResult<String> {
        let js = build_summary_js(view, &self.source);
        serde_json::to_string_pretty(&js).context(ParsingJsonSnafu {})
    }
}

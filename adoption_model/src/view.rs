//! A snapshot of what the dashboard displays for a session.
//!
//! The renderers only consume these structures. Nothing here depends on how
//! the gauges, the map or the cards are eventually drawn.

use crate::buckets::{bucket, Bucket, GAUGE_STEPS};
use crate::{Mode, Session};

pub const DASHBOARD_TITLE: &str = "Campus Adoption Dashboard";
pub const GLOBAL_GAUGE_TITLE: &str = "System-wide Adoption %";
pub const SITE_GAUGE_TITLE: &str = "Adoption %";
pub const CAPTION: &str = "No data is saved. Reset restores original CSV values.";

/// The bar of the site gauges does not depend on the rate.
pub const CARD_GAUGE_COLOR: &str = "#1976D2";
pub const CARD_COLUMNS: usize = 3;

/// Fill color (RGBA) of the map markers.
pub const MARKER_FILL: [u8; 4] = [255, 0, 0, 80];

/// The map cannot be zoomed or panned.
pub const MAP_VIEWPORT: MapViewport = MapViewport {
    latitude: 36.5,
    longitude: -119.5,
    zoom: 5.2,
    min_zoom: 5.2,
    max_zoom: 5.2,
    pitch: 0.0,
};

#[derive(PartialEq, Debug, Clone, Copy)]
pub struct MapViewport {
    pub latitude: f64,
    pub longitude: f64,
    pub zoom: f64,
    pub min_zoom: f64,
    pub max_zoom: f64,
    pub pitch: f64,
}

#[derive(PartialEq, Debug, Clone)]
pub struct GaugeView {
    pub title: String,
    pub value: f64,
    pub bar_color: &'static str,
    pub axis: (f64, f64),
    /// Background bands: (from, to, color)
    pub steps: Vec<(f64, f64, &'static str)>,
}

impl GaugeView {
    fn new(title: &str, value: f64, bar_color: &'static str) -> GaugeView {
        GaugeView {
            title: title.to_string(),
            value,
            bar_color,
            axis: (0.0, 100.0),
            steps: GAUGE_STEPS
                .iter()
                .map(|(low, high, b)| (*low, *high, b.color()))
                .collect(),
        }
    }
}

#[derive(PartialEq, Debug, Clone)]
pub struct MarkerView {
    pub id: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Between 5 and 30, proportional to the number of users.
    pub size: f64,
    /// In meters.
    pub radius: f64,
    pub fill: [u8; 4],
    pub tooltip: String,
}

#[derive(PartialEq, Debug, Clone)]
pub struct MapView {
    pub viewport: MapViewport,
    pub markers: Vec<MarkerView>,
}

/// The bounded input to edit the active users of a site.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ActiveUsersInput {
    pub label: String,
    pub min: u64,
    pub max: u64,
    pub value: u64,
}

#[derive(PartialEq, Debug, Clone)]
pub struct SiteCard {
    pub id: String,
    /// Column in the grid of cards.
    pub column: usize,
    pub active_users: u64,
    pub total_users: u64,
    pub adoption_pct: f64,
    pub bucket: Bucket,
    pub gauge: GaugeView,
    /// Only present in what-if mode.
    pub input: Option<ActiveUsersInput>,
}

#[derive(PartialEq, Debug, Clone)]
pub struct DashboardView {
    pub title: String,
    pub mode: Mode,
    pub global: GaugeView,
    pub total_active_users: u64,
    pub total_users: u64,
    pub map: MapView,
    pub cards: Vec<SiteCard>,
    pub caption: String,
}

pub fn marker_size(total_users: u64) -> f64 {
    (total_users as f64 / 1000.0).clamp(5.0, 30.0)
}

impl<'a> Session<'a> {
    /// Computes everything the dashboard displays in the current state.
    pub fn view(&self) -> DashboardView {
        let global_pct = self.global_adoption_pct();
        let mut markers: Vec<MarkerView> = Vec::new();
        let mut cards: Vec<SiteCard> = Vec::new();
        for (idx, site) in self.dataset().sites().iter().enumerate() {
            let active = self.effective_at(idx);
            let pct = self.site_pct_at(idx);
            let size = marker_size(site.total_users);
            markers.push(MarkerView {
                id: site.id.clone(),
                latitude: site.latitude,
                longitude: site.longitude,
                size,
                radius: size * 1000.0,
                fill: MARKER_FILL,
                tooltip: format!(
                    "{}\nTotal Users: {}\nActive Users: {}\nAdoption %: {:.1}%",
                    site.id, site.total_users, active, pct
                ),
            });
            let input = match self.mode() {
                Mode::WhatIf => Some(ActiveUsersInput {
                    label: format!("Set Active Users for {}", site.id),
                    min: 0,
                    max: site.total_users,
                    value: self.simulated_at(idx),
                }),
                Mode::Actual => None,
            };
            cards.push(SiteCard {
                id: site.id.clone(),
                column: idx % CARD_COLUMNS,
                active_users: active,
                total_users: site.total_users,
                adoption_pct: pct,
                bucket: bucket(pct),
                gauge: GaugeView::new(SITE_GAUGE_TITLE, pct, CARD_GAUGE_COLOR),
                input,
            });
        }
        DashboardView {
            title: DASHBOARD_TITLE.to_string(),
            mode: self.mode(),
            global: GaugeView::new(GLOBAL_GAUGE_TITLE, global_pct, bucket(global_pct).color()),
            total_active_users: self.total_active_users(),
            total_users: self.total_users(),
            map: MapView {
                viewport: MAP_VIEWPORT,
                markers,
            },
            cards,
            caption: CAPTION.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::Builder;

    #[test]
    fn marker_sizes_are_clipped() {
        assert_eq!(marker_size(1_000), 5.0);
        assert_eq!(marker_size(12_500), 12.5);
        assert_eq!(marker_size(45_000), 30.0);
    }

    #[test]
    fn view_in_actual_mode() {
        let dataset = Builder::new()
            .site("A", 100, 50, 34.0, -118.0)
            .site("B", 200, 50, 37.0, -122.0)
            .site("C", 40_000, 4_000, 38.0, -121.0)
            .site("D", 10, 9, 39.0, -120.0)
            .build()
            .unwrap();
        let mut session = dataset.session();
        session.set_active("A", 0).unwrap();
        let v = session.view();
        assert_eq!(v.mode, Mode::Actual);
        assert_eq!(v.total_users, 40_310);
        assert_eq!(v.total_active_users, 4_109);
        assert_eq!(v.cards.len(), 4);
        assert_eq!(v.cards[0].active_users, 50);
        assert_eq!(v.cards[0].adoption_pct, 50.0);
        assert_eq!(v.cards[0].bucket, Bucket::Yellow);
        assert_eq!(v.cards[1].bucket, Bucket::Orange);
        assert_eq!(v.cards[3].column, 0);
        assert_eq!(v.cards[3].adoption_pct, 90.0);
        assert!(v.cards.iter().all(|c| c.input.is_none()));
        assert!(v.cards.iter().all(|c| c.gauge.bar_color == CARD_GAUGE_COLOR));
        assert_eq!(v.map.viewport, MAP_VIEWPORT);
        assert_eq!(v.map.markers[2].size, 30.0);
        assert_eq!(v.map.markers[2].radius, 30_000.0);
        assert_eq!(v.global.steps.len(), 5);
        assert_eq!(v.global.steps[1], (10.0, 25.0, "#FFA500"));
    }

    #[test]
    fn view_in_what_if_mode() {
        let dataset = Builder::new()
            .site("A", 100, 50, 34.0, -118.0)
            .site("B", 200, 50, 37.0, -122.0)
            .build()
            .unwrap();
        let mut session = dataset.session();
        session.toggle_mode();
        session.set_active("A", 100).unwrap();
        let v = session.view();
        assert_eq!(v.global.value, 50.0);
        assert_eq!(v.global.bar_color, "#FFD700");
        assert_eq!(
            v.cards[0].input,
            Some(ActiveUsersInput {
                label: "Set Active Users for A".to_string(),
                min: 0,
                max: 100,
                value: 100,
            })
        );
        assert_eq!(v.cards[1].input.as_ref().map(|i| i.max), Some(200));
        assert_eq!(
            v.map.markers[0].tooltip,
            "A\nTotal Users: 100\nActive Users: 100\nAdoption %: 100.0%"
        );
    }

    #[test]
    fn global_gauge_color_uses_unrounded_rate() {
        // 21 / 200 = 10.5%, in the gap between red and orange.
        let dataset = Builder::new().site("A", 200, 21, 0.0, 0.0).build().unwrap();
        let v = dataset.session().view();
        assert_eq!(v.global.value, 10.5);
        assert_eq!(v.global.bar_color, "#CCCCCC");
    }

    #[test]
    fn tooltips_show_one_decimal() {
        let dataset = Builder::new()
            .site("A", 300, 100, 0.0, 0.0)
            .site("B", 200, 50, 0.0, 0.0)
            .build()
            .unwrap();
        let v = dataset.session().view();
        assert_eq!(
            v.map.markers[0].tooltip,
            "A\nTotal Users: 300\nActive Users: 100\nAdoption %: 33.3%"
        );
        assert!(v.map.markers[1].tooltip.ends_with("Adoption %: 25.0%"));
    }
}

use crate::figure::{Figure, LegendEntry, MarkerFill, Rgb, Shape};
use crate::fotmob_fetch::MatchPayload;
use crate::pitch::{PitchDims, draw_pitch, normalize};
use crate::state::{MatchDetail, Shot};

pub const HOME_COLOR: Rgb = Rgb(0xFF, 0xA5, 0x00);
pub const AWAY_COLOR: Rgb = Rgb(0x90, 0xEE, 0x90);
pub const NEUTRAL_COLOR: Rgb = Rgb::BLACK;

/// Marker area (pt²) per unit of expected goals.
pub const MARKER_SCALE: f64 = 500.0;

#[derive(Debug, Clone, PartialEq)]
pub struct ShotMapRender {
    pub figure: Figure,
    pub home_name: String,
    pub away_name: String,
}

/// Draws the shot map for a raw payload, or `None` when there is nothing to display.
pub fn render_match(payload: &MatchPayload, dims: PitchDims) -> Option<ShotMapRender> {
    let detail = payload.to_match_detail()?;
    Some(ShotMapRender {
        figure: compose(&detail, dims),
        home_name: detail.home.name.clone(),
        away_name: detail.away.name.clone(),
    })
}

pub fn compose(detail: &MatchDetail, dims: PitchDims) -> Figure {
    let mut figure = Figure::default();
    draw_pitch(&mut figure, dims);

    for shot in &detail.shots {
        let (x, y) = normalize(shot.x, shot.y, dims);
        let fill = if shot.event.is_goal() {
            MarkerFill::Filled
        } else {
            MarkerFill::Hollow
        };
        figure.push(Shape::Marker {
            x,
            y,
            size: marker_size(shot),
            color: team_color(detail, shot.team_id),
            fill,
        });
    }

    figure.title = format!(
        "{} {} {} - {}",
        detail.home.name,
        detail.score_label(),
        detail.away.name,
        detail.status_label()
    );
    figure.legend = vec![
        LegendEntry {
            label: detail.home.name.clone(),
            color: HOME_COLOR,
        },
        LegendEntry {
            label: detail.away.name.clone(),
            color: AWAY_COLOR,
        },
    ];
    figure
}

pub fn marker_size(shot: &Shot) -> f64 {
    MARKER_SCALE * shot.effective_xg()
}

fn team_color(detail: &MatchDetail, team_id: Option<u64>) -> Rgb {
    match team_id {
        Some(id) if detail.home.id == Some(id) => HOME_COLOR,
        Some(id) if detail.away.id == Some(id) => AWAY_COLOR,
        _ => NEUTRAL_COLOR,
    }
}

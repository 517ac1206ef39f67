//! Default component layout for the five standard screens

use crate::config::PanelConfig;
use anyhow::Result;
use log::{debug, warn};
use rcs_panel_core::{BoxedComponent, ConditionKind, ViewId};
use rcs_panel_displayers::{
    AlarmList, AlarmListConfig, AnnunciatorTile, Gauge, GaugeConfig, Indicator, IndicatorConfig,
    ScreenTabs,
};

const OVERVIEW: ViewId = ViewId(1);
const PRIMARY_LOOP: ViewId = ViewId(2);
const PRESSURIZER: ViewId = ViewId(3);
const STEAM_GENERATORS: ViewId = ViewId(4);
const ALARM_SUMMARY: ViewId = ViewId(5);

/// Gauges per screen
const GAUGES: &[(ViewId, &[ConditionKind])] = &[
    (
        OVERVIEW,
        &[
            ConditionKind::Power,
            ConditionKind::AverageTemperature,
            ConditionKind::PressurizerPressure,
            ConditionKind::CoolantFlow,
        ],
    ),
    (
        PRIMARY_LOOP,
        &[
            ConditionKind::HotLegTemperature,
            ConditionKind::ColdLegTemperature,
            ConditionKind::AverageTemperature,
            ConditionKind::CoolantFlow,
            ConditionKind::BoronConcentration,
        ],
    ),
    (
        PRESSURIZER,
        &[ConditionKind::PressurizerPressure, ConditionKind::PressurizerLevel],
    ),
    (
        STEAM_GENERATORS,
        &[ConditionKind::SteamGeneratorLevel, ConditionKind::ContainmentPressure],
    ),
];

/// Mimic-diagram lamps per screen
const INDICATORS: &[(ViewId, &[ConditionKind])] = &[
    (
        PRIMARY_LOOP,
        &[ConditionKind::HotLegTemperature, ConditionKind::ColdLegTemperature],
    ),
    (PRESSURIZER, &[ConditionKind::PressurizerLevel]),
    (STEAM_GENERATORS, &[ConditionKind::SteamGeneratorLevel]),
];

/// Components for the configured screens.
///
/// The tab strip is always present. The overview carries one annunciator tile
/// per configured condition; components for screens missing from the config
/// are left out.
pub fn default_components(config: &PanelConfig) -> Result<Vec<BoxedComponent>> {
    let has_screen = |id: ViewId| config.screens.iter().any(|d| d.id == id);
    let gauge_interval_ms = config.gauge_interval_ms;
    let diagram_interval_ms = config.diagram_interval_ms;

    let mut components: Vec<BoxedComponent> = vec![Box::new(ScreenTabs::new("tabs"))];

    for (screen, kinds) in GAUGES {
        if !has_screen(*screen) {
            warn!("Screen {} not configured, skipping its gauges", screen);
            continue;
        }
        for kind in kinds.iter() {
            let gauge_config = GaugeConfig {
                smoothing_alpha: config.smoothing_alpha,
                update_interval_ms: gauge_interval_ms,
                ..GaugeConfig::new(*kind).on_screen(*screen)
            };
            let id = format!("gauge_{}_{}", screen.0, kind);
            components.push(Box::new(Gauge::new(&id, gauge_config)?));
        }
    }

    for (screen, kinds) in INDICATORS {
        if !has_screen(*screen) {
            continue;
        }
        for kind in kinds.iter() {
            let indicator_config = IndicatorConfig {
                update_interval_ms: diagram_interval_ms,
                ..IndicatorConfig::new(*kind).on_screen(*screen)
            };
            let id = format!("lamp_{}_{}", screen.0, kind);
            components.push(Box::new(Indicator::new(&id, indicator_config)));
        }
    }

    if has_screen(OVERVIEW) {
        for spec in &config.conditions {
            let id = format!("tile_{}", spec.id);
            components.push(Box::new(AnnunciatorTile::new(&id, &spec.id).on_screen(OVERVIEW)));
        }
    }

    if has_screen(ALARM_SUMMARY) {
        components.push(Box::new(AlarmList::new(
            "alarm_list",
            AlarmListConfig {
                screen: Some(ALARM_SUMMARY),
                ..AlarmListConfig::default()
            },
        )));
    }

    debug!("Built {} default components", components.len());
    Ok(components)
}

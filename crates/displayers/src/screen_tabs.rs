//! Screen selector strip, always visible

use anyhow::Result;
use rcs_panel_core::{ActivationTrigger, PanelContext, ViewComponent, ViewId};

#[derive(Debug, Clone, PartialEq)]
struct Tab {
    id: ViewId,
    label: String,
    active: bool,
}

pub struct ScreenTabs {
    id: String,
    tabs: Vec<Tab>,
}

impl ScreenTabs {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            tabs: Vec::new(),
        }
    }

    pub fn active(&self) -> Option<ViewId> {
        self.tabs.iter().find(|t| t.active).map(|t| t.id)
    }

    pub fn tab_count(&self) -> usize {
        self.tabs.len()
    }
}

impl ViewComponent for ScreenTabs {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        "Screen Tabs"
    }

    fn update_data(&mut self, ctx: &PanelContext<'_>) -> Result<()> {
        let screens = ctx.screens;
        self.tabs = screens
            .ids()
            .into_iter()
            .filter_map(|id| {
                let screen = screens.screen(id)?;
                let screen = screen.borrow();
                let descriptor = screen.descriptor();
                let label = match &descriptor.trigger {
                    ActivationTrigger::Key(key) => format!("{} {}", key, descriptor.name),
                    _ => descriptor.name.clone(),
                };
                Some(Tab {
                    id,
                    label,
                    active: screens.is_visible(id),
                })
            })
            .collect();
        Ok(())
    }

    fn text(&self) -> Vec<String> {
        let strip = self
            .tabs
            .iter()
            .map(|tab| {
                if tab.active {
                    format!("[{}]", tab.label)
                } else {
                    format!(" {} ", tab.label)
                }
            })
            .collect::<Vec<_>>()
            .join("|");
        vec![strip]
    }
}

// src/main.rs
use chrono::Local;
use iced::widget::{
    button, column, container, pick_list, row, scrollable, slider, text, Column, Row, Space,
};
use iced::{executor, window, Alignment, Application, Command, Element, Length, Settings, Theme};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

mod config;
mod data_types;
mod error;
mod filter;
mod insight;
mod sheet_loader;
mod ui;

use config::AppConfig;
use data_types::Table;
use error::{user_message, ConfigError};
use filter::{FilterControls, FilterSelection, RangeFilter, ALL_CATEGORIES};
use insight::InsightClient;
use sheet_loader::SheetLoader;

const VERSION: &str = env!("CARGO_PKG_VERSION");

pub fn main() -> iced::Result {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    CampaignAssistant::run(Settings {
        window: window::Settings {
            size: (1280, 860),
            ..Default::default()
        },
        ..Settings::with_flags(AppConfig::from_env())
    })
}

struct CampaignAssistant {
    config_error: Option<String>,
    worksheet: String,
    loader: Option<SheetLoader>,
    insights: Option<InsightClient>,
    table: Option<Table>,
    filtered: Option<Table>,
    controls: Option<FilterControls>,
    selected_category: String,
    selected_ranges: Vec<(f64, f64)>,
    loading: bool,
    load_error: Option<String>,
    load_banner: Option<String>,
    analyzing: bool,
    insight: Option<String>,
    insight_error: Option<String>,
    is_dark_mode: bool,
}

#[derive(Debug, Clone)]
enum Message {
    Reload,
    DataLoaded(Result<Table, String>),
    CategoryPicked(String),
    RangeMinChanged(usize, f64),
    RangeMaxChanged(usize, f64),
    Analyze,
    InsightReady(Result<String, String>),
    ToggleTheme,
}

fn load_command(loader: SheetLoader) -> Command<Message> {
    Command::perform(
        async move {
            loader.load().await.map_err(|e| {
                error!("loading worksheet failed: {e}");
                user_message("Error loading data", &e)
            })
        },
        Message::DataLoaded,
    )
}

impl Application for CampaignAssistant {
    type Executor = executor::Default;
    type Message = Message;
    type Theme = iced::Theme;
    type Flags = Result<AppConfig, ConfigError>;

    fn new(flags: Self::Flags) -> (Self, Command<Message>) {
        let mut app = CampaignAssistant {
            config_error: None,
            worksheet: String::new(),
            loader: None,
            insights: None,
            table: None,
            filtered: None,
            controls: None,
            selected_category: ALL_CATEGORIES.to_string(),
            selected_ranges: Vec::new(),
            loading: false,
            load_error: None,
            load_banner: None,
            analyzing: false,
            insight: None,
            insight_error: None,
            is_dark_mode: true,
        };

        match flags {
            Ok(config) => {
                let loader = SheetLoader::new(&config);
                app.worksheet = config.worksheet.clone();
                app.insights = Some(InsightClient::new(&config));
                app.loader = Some(loader.clone());
                app.loading = true;
                (app, load_command(loader))
            }
            Err(err) => {
                // Without a valid configuration nothing else runs: no
                // data load, no text-generation call.
                error!("startup configuration invalid: {err}");
                app.config_error = Some(user_message("Configuration error", &err));
                (app, Command::none())
            }
        }
    }

    fn title(&self) -> String {
        format!("AI PPC Campaign Assistant v{}", VERSION)
    }

    fn theme(&self) -> Theme {
        if self.is_dark_mode {
            Theme::Dark
        } else {
            Theme::Light
        }
    }

    fn update(&mut self, message: Message) -> Command<Message> {
        match message {
            Message::Reload => {
                if self.loading {
                    return Command::none();
                }
                if let Some(loader) = &self.loader {
                    self.loading = true;
                    self.insight = None;
                    self.insight_error = None;
                    return load_command(loader.clone());
                }
                Command::none()
            }

            Message::DataLoaded(Ok(table)) => {
                info!(rows = table.row_count(), "table loaded");
                self.loading = false;
                self.load_error = None;
                self.load_banner = Some(format!(
                    "Loaded {} rows from '{}' at {}",
                    table.row_count(),
                    self.worksheet,
                    Local::now().format("%H:%M:%S")
                ));

                let controls = FilterControls::from_table(&table);
                self.selected_category = ALL_CATEGORIES.to_string();
                self.selected_ranges = controls.numeric.iter().map(|c| (c.min, c.max)).collect();
                self.controls = Some(controls);
                self.table = Some(table);
                self.refilter();
                Command::none()
            }

            Message::DataLoaded(Err(message)) => {
                self.loading = false;
                self.load_error = Some(message);
                self.load_banner = None;
                self.table = None;
                self.filtered = None;
                self.controls = None;
                self.insight = None;
                self.insight_error = None;
                Command::none()
            }

            Message::CategoryPicked(value) => {
                self.selected_category = value;
                self.refilter();
                Command::none()
            }

            Message::RangeMinChanged(index, value) => {
                let bounds = self.control_bounds(index);
                if let (Some((low, _high)), Some(sel)) =
                    (bounds, self.selected_ranges.get_mut(index))
                {
                    sel.0 = value.clamp(low, sel.1);
                    self.refilter();
                }
                Command::none()
            }

            Message::RangeMaxChanged(index, value) => {
                let bounds = self.control_bounds(index);
                if let (Some((_low, high)), Some(sel)) =
                    (bounds, self.selected_ranges.get_mut(index))
                {
                    sel.1 = value.clamp(sel.0, high);
                    self.refilter();
                }
                Command::none()
            }

            Message::Analyze => {
                if self.analyzing {
                    return Command::none();
                }
                if let (Some(client), Some(filtered)) = (&self.insights, &self.filtered) {
                    self.analyzing = true;
                    self.insight = None;
                    self.insight_error = None;

                    let client = client.clone();
                    let table = filtered.clone();
                    return Command::perform(
                        async move {
                            client.request_insight(&table).await.map_err(|e| {
                                error!("text generation request failed: {e}");
                                user_message("Error calling GPT", &e)
                            })
                        },
                        Message::InsightReady,
                    );
                }
                Command::none()
            }

            Message::InsightReady(Ok(insight)) => {
                self.analyzing = false;
                self.insight = Some(insight);
                Command::none()
            }

            Message::InsightReady(Err(message)) => {
                // The loaded table and filters stay on screen; only the
                // analysis section reports the failure.
                self.analyzing = false;
                self.insight_error = Some(message);
                Command::none()
            }

            Message::ToggleTheme => {
                self.is_dark_mode = !self.is_dark_mode;
                Command::none()
            }
        }
    }

    fn view(&self) -> Element<Message> {
        if let Some(message) = &self.config_error {
            return container(
                container(text(message).size(20))
                    .padding(15)
                    .style(ui::error_style()),
            )
            .width(Length::Fill)
            .height(Length::Fill)
            .center_x()
            .center_y()
            .padding(40)
            .into();
        }

        let mut page = column![text("AI PPC Campaign Assistant").size(32)]
            .spacing(15)
            .padding(20)
            .width(Length::Fill);

        if self.loading {
            page = page.push(text("Loading data...").size(16));
        }
        if let Some(message) = &self.load_error {
            page = page.push(
                container(text(message).size(16))
                    .padding(10)
                    .width(Length::Fill)
                    .style(ui::error_style()),
            );
        } else if let Some(banner) = &self.load_banner {
            page = page.push(
                container(text(banner).size(16))
                    .padding(10)
                    .width(Length::Fill)
                    .style(ui::success_style()),
            );
        }

        if let Some(filtered) = &self.filtered {
            page = page.push(self.filter_section());
            page = page.push(self.table_view(filtered));
            page = page.push(self.analysis_section());
        }

        let mut reload = button(text("Reload").size(16)).padding(8);
        if !self.loading && self.loader.is_some() {
            reload = reload.on_press(Message::Reload);
        }
        let footer = row![
            reload,
            button(text("Theme").size(16))
                .padding(8)
                .on_press(Message::ToggleTheme),
            Space::with_width(Length::Fill),
            text(format!("v{}", VERSION)).size(14),
        ]
        .spacing(10)
        .align_items(Alignment::Center);
        page = page.push(footer);

        scrollable(page).into()
    }
}

impl CampaignAssistant {
    fn control_bounds(&self, index: usize) -> Option<(f64, f64)> {
        self.controls
            .as_ref()
            .and_then(|controls| controls.numeric.get(index))
            .map(|control| (control.min, control.max))
    }

    /// Re-derives the filtered table from the cached load. Filter changes
    /// never refetch the spreadsheet; a stale insight is dropped because it
    /// described a table the user can no longer see.
    fn refilter(&mut self) {
        self.insight = None;
        self.insight_error = None;
        self.filtered = match (&self.table, &self.controls) {
            (Some(table), Some(controls)) => {
                let selection =
                    build_selection(controls, &self.selected_category, &self.selected_ranges);
                Some(filter::apply(table, &selection))
            }
            _ => None,
        };
    }

    fn filter_section(&self) -> Element<Message> {
        let controls = match &self.controls {
            Some(controls) => controls,
            None => return Space::with_height(Length::Fixed(0.0)).into(),
        };

        let mut section = column![text("Filter Data").size(24)].spacing(10);

        if let Some(ctl) = &controls.categorical {
            section = section.push(
                row![
                    text(format!("Filter by {}:", ctl.column))
                        .size(16)
                        .width(Length::Fixed(220.0)),
                    pick_list(
                        ctl.options.clone(),
                        Some(self.selected_category.clone()),
                        Message::CategoryPicked,
                    ),
                ]
                .spacing(10)
                .align_items(Alignment::Center),
            );
        }

        for (index, ctl) in controls.numeric.iter().enumerate() {
            let (sel_min, sel_max) = match self.selected_ranges.get(index) {
                Some(selected) => *selected,
                None => continue,
            };
            // A degenerate min == max bound still renders: widen the slider
            // span and let the update handler clamp the selection back.
            let upper = if ctl.max > ctl.min { ctl.max } else { ctl.min + 1.0 };
            let step = ((upper - ctl.min) / 100.0).max(0.01);

            section = section.push(
                row![
                    text(format!("{} range", ctl.column))
                        .size(16)
                        .width(Length::Fixed(220.0)),
                    text(format_bound(sel_min))
                        .size(14)
                        .width(Length::Fixed(80.0)),
                    slider(ctl.min..=upper, sel_min, move |v| {
                        Message::RangeMinChanged(index, v)
                    })
                    .step(step),
                    slider(ctl.min..=upper, sel_max, move |v| {
                        Message::RangeMaxChanged(index, v)
                    })
                    .step(step),
                    text(format_bound(sel_max))
                        .size(14)
                        .width(Length::Fixed(80.0)),
                ]
                .spacing(10)
                .align_items(Alignment::Center),
            );
        }

        section.into()
    }

    fn table_view(&self, data: &Table) -> Element<Message> {
        let header_cells: Vec<Element<Message>> = data
            .headers
            .iter()
            .map(|header| {
                container(text(header).size(16))
                    .width(Length::Fixed(140.0))
                    .padding(6)
                    .style(ui::header_style())
                    .into()
            })
            .collect();

        let body_rows: Vec<Element<Message>> = data
            .rows
            .iter()
            .map(|row| {
                Row::with_children(
                    row.iter()
                        .map(|cell| {
                            container(text(cell).size(15))
                                .width(Length::Fixed(140.0))
                                .padding(6)
                                .into()
                        })
                        .collect(),
                )
                .spacing(1)
                .into()
            })
            .collect();

        let table = column![
            Row::with_children(header_cells).spacing(1),
            Column::with_children(body_rows).spacing(1),
        ]
        .spacing(1);

        column![
            text(format!("{} rows", data.row_count())).size(14),
            scrollable(table).height(Length::Fixed(320.0)),
        ]
        .spacing(6)
        .into()
    }

    fn analysis_section(&self) -> Element<Message> {
        let mut section = column![text("AI Analysis").size(24)].spacing(10);

        let mut analyze = button(text("Analyze with GPT").size(16))
            .padding(8)
            .style(ui::accent_style());
        if !self.analyzing {
            analyze = analyze.on_press(Message::Analyze);
        }
        section = section.push(analyze);

        if self.analyzing {
            section = section.push(text("Analyzing... please wait").size(16));
        }
        if let Some(message) = &self.insight_error {
            section = section.push(
                container(text(message).size(16))
                    .padding(10)
                    .width(Length::Fill)
                    .style(ui::error_style()),
            );
        }
        if let Some(insight) = &self.insight {
            section = section.push(text("GPT Suggestions").size(20));
            section = section.push(scrollable(text(insight).size(16)).height(Length::Fixed(260.0)));
        }

        section.into()
    }
}

fn build_selection(
    controls: &FilterControls,
    category: &str,
    ranges: &[(f64, f64)],
) -> FilterSelection {
    FilterSelection {
        category: controls.categorical.as_ref().and_then(|ctl| {
            if category == ALL_CATEGORIES {
                None
            } else {
                Some((ctl.column.clone(), category.to_string()))
            }
        }),
        ranges: controls
            .numeric
            .iter()
            .zip(ranges)
            .map(|(ctl, (min, max))| RangeFilter {
                column: ctl.column.clone(),
                min: *min,
                max: *max,
            })
            .collect(),
    }
}

fn format_bound(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        format!("{:.2}", value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{CategoricalControl, NumericControl};

    fn controls() -> FilterControls {
        FilterControls {
            categorical: Some(CategoricalControl {
                column: "category".to_string(),
                options: vec!["All".to_string(), "Search".to_string()],
            }),
            numeric: vec![NumericControl {
                column: "clicks".to_string(),
                min: 5.0,
                max: 20.0,
            }],
        }
    }

    #[test]
    fn sentinel_selection_has_no_categorical_constraint() {
        let selection = build_selection(&controls(), ALL_CATEGORIES, &[(5.0, 20.0)]);
        assert!(selection.category.is_none());
        assert_eq!(selection.ranges.len(), 1);
    }

    #[test]
    fn picked_value_becomes_an_equality_constraint() {
        let selection = build_selection(&controls(), "Search", &[(5.0, 20.0)]);
        assert_eq!(
            selection.category,
            Some(("category".to_string(), "Search".to_string()))
        );
    }

    #[test]
    fn range_state_maps_onto_the_numeric_controls() {
        let selection = build_selection(&controls(), ALL_CATEGORIES, &[(8.0, 12.0)]);
        assert_eq!(
            selection.ranges,
            vec![RangeFilter {
                column: "clicks".to_string(),
                min: 8.0,
                max: 12.0,
            }]
        );
    }

    #[test]
    fn bounds_format_compactly() {
        assert_eq!(format_bound(10.0), "10");
        assert_eq!(format_bound(2.5), "2.50");
    }
}

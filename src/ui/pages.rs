use eframe::egui::{self, RichText, ScrollArea, Ui};
use egui_extras::{Column, TableBuilder};

use survey_lens::data::report::{DashboardSummary, LabeledCount, display_value};
use survey_lens::data::segment::Segment;

use crate::color::{ColorMap, score_color, segment_color, threat_color};
use crate::state::{AppState, Page};
use crate::ui::charts::{BLUE, BarItem, NAVY, bar_chart, metric_card, number, pct};

// ---------------------------------------------------------------------------
// Central panel
// ---------------------------------------------------------------------------

/// Render the selected page from the current summary.
pub fn central_panel(ui: &mut Ui, state: &AppState) {
    let Some(summary) = &state.summary else {
        let message = if state.dataset.is_some() {
            "Figures unavailable for the current filters, see the status bar."
        } else {
            "Open a survey file to begin  (File → Open…)"
        };
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading(message);
        });
        return;
    };

    ui.heading(state.page.title());
    ui.label(format!(
        "{} of {} respondents",
        summary.respondents, summary.total_respondents
    ));
    ui.separator();

    if summary.respondents == 0 {
        ui.label(RichText::new("No respondents match the current filters.").italics());
        return;
    }

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            match state.page {
                Page::Overview => overview(ui, summary, &state.brand_colors),
                Page::Executive => executive(ui, summary),
                Page::Segmentation => segmentation(ui, summary),
                Page::Competition => competition(ui, summary, &state.brand_colors),
                Page::Strategy => strategy(ui, summary),
            }

            if state.show_raw_data {
                ui.separator();
                raw_data(ui, state);
            }
        });
}

fn count_bars(counts: &[LabeledCount], colors: &ColorMap) -> Vec<BarItem> {
    counts
        .iter()
        .map(|c| BarItem {
            label: c.label.clone(),
            value: c.count as f64,
            color: colors.color_for(&c.label),
        })
        .collect()
}

fn palette_for(counts: &[LabeledCount]) -> ColorMap {
    ColorMap::new(counts.iter().map(|c| c.label.clone()))
}

// ---------------------------------------------------------------------------
// Pages
// ---------------------------------------------------------------------------

fn overview(ui: &mut Ui, summary: &DashboardSummary, brand_colors: &ColorMap) {
    let o = &summary.overview;
    ui.columns(4, |cols| {
        metric_card(&mut cols[0], &pct(o.awareness), &format!("{} Awareness", o.home_brand), NAVY);
        metric_card(&mut cols[1], &number(o.avg_rating, "/5"), "Average Rating", NAVY);
        metric_card(&mut cols[2], &number(o.net_promoter, ""), "Net Promoter Score", NAVY);
        metric_card(&mut cols[3], &pct(o.usage), "Usage Rate", NAVY);
    });
    ui.add_space(8.0);

    let awareness: Vec<BarItem> = summary
        .competition
        .brands
        .iter()
        .map(|b| BarItem {
            label: b.brand.clone(),
            value: b.aware as f64,
            color: brand_colors.color_for(&b.brand),
        })
        .collect();
    let ratings: Vec<BarItem> = o
        .rating_distribution
        .iter()
        .map(|c| BarItem {
            label: format!("{} stars", c.label),
            value: c.count as f64,
            color: BLUE,
        })
        .collect();

    ui.columns(2, |cols| {
        bar_chart(&mut cols[0], "overview_awareness", "Brand Awareness", "Respondents", &awareness);
        bar_chart(&mut cols[1], "overview_ratings", "Rating Distribution", "Respondents", &ratings);
    });

    let by_familiarity: Vec<BarItem> = o
        .rating_by_familiarity
        .iter()
        .map(|v| BarItem {
            label: v.label.clone(),
            value: v.value,
            color: NAVY,
        })
        .collect();
    let ages = count_bars(&o.age_groups, &palette_for(&o.age_groups));

    ui.columns(2, |cols| {
        bar_chart(
            &mut cols[0],
            "overview_familiarity",
            "Average Rating by Familiarity",
            "Rating",
            &by_familiarity,
        );
        bar_chart(&mut cols[1], "overview_age", "Age Distribution", "Respondents", &ages);
    });
}

fn executive(ui: &mut Ui, summary: &DashboardSummary) {
    let e = &summary.executive;
    let o = &summary.overview;
    ui.columns(4, |cols| {
        metric_card(&mut cols[0], &pct(e.completion_rate), "Data Completion Rate", NAVY);
        metric_card(&mut cols[1], &pct(e.positive_sentiment), "Positive Sentiment", NAVY);
        metric_card(&mut cols[2], &pct(o.recommendation_rate), "Would Recommend", NAVY);
        metric_card(&mut cols[3], &number(o.avg_familiarity, "/3"), "Average Familiarity", NAVY);
    });
    ui.add_space(8.0);

    ui.strong("Key insights");
    let insight = |item: &Option<LabeledCount>, text: &str| match item {
        Some(c) => format!("{}: {} ({} respondents)", text, c.label, c.count),
        None => format!("{text}: none reported"),
    };
    ui.label(insight(&e.top_strength, "Top strength"));
    ui.label(insight(&e.top_improvement, "Most requested improvement"));
    ui.label(insight(&e.top_competitor, "Best-known competitor"));
    ui.add_space(8.0);

    let recommend = count_bars(
        &e.recommendation_distribution,
        &palette_for(&e.recommendation_distribution),
    );
    let genders = count_bars(&o.genders, &palette_for(&o.genders));
    ui.columns(2, |cols| {
        bar_chart(
            &mut cols[0],
            "exec_recommend",
            "Recommendation Likelihood",
            "Respondents",
            &recommend,
        );
        bar_chart(&mut cols[1], "exec_gender", "Gender Distribution", "Respondents", &genders);
    });
}

fn segmentation(ui: &mut Ui, summary: &DashboardSummary) {
    let segments = &summary.segmentation.segments;
    let count_of = |segment: Segment| {
        segments
            .iter()
            .find(|s| s.segment == segment)
            .map_or(0, |s| s.profile.count)
    };

    let named = [Segment::Champions, Segment::AtRisk, Segment::NewUsers, Segment::Prospects];
    ui.columns(named.len(), |cols| {
        for (col, segment) in cols.iter_mut().zip(named) {
            metric_card(
                col,
                &count_of(segment).to_string(),
                segment.label(),
                segment_color(segment),
            );
            col.label(RichText::new(segment.description()).small().weak());
        }
    });
    ui.add_space(8.0);

    let shares: Vec<BarItem> = segments
        .iter()
        .map(|s| BarItem {
            label: s.label.clone(),
            value: s.share,
            color: segment_color(s.segment),
        })
        .collect();
    bar_chart(ui, "segment_shares", "Customer Segments", "Share of respondents (%)", &shares);
    ui.add_space(8.0);

    ui.strong("Segment Characteristics");
    ui.push_id("segment_table", |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            .vscroll(false)
            .column(Column::auto().at_least(110.0))
            .columns(Column::auto().at_least(90.0), 5)
            .header(20.0, |mut header| {
                for title in ["Segment", "Count", "Rating", "Recommend", "Labs Used", "Familiarity"] {
                    header.col(|ui| {
                        ui.strong(title);
                    });
                }
            })
            .body(|mut body| {
                for s in segments {
                    let p = &s.profile;
                    body.row(18.0, |mut row| {
                        row.col(|ui| {
                            ui.colored_label(segment_color(s.segment), &s.label);
                        });
                        row.col(|ui| {
                            ui.label(p.count.to_string());
                        });
                        for value in [p.avg_rating, p.avg_recommendation, p.avg_labs_used, p.avg_familiarity] {
                            row.col(|ui| {
                                ui.label(number(value, ""));
                            });
                        }
                    });
                }
            });
    });
    ui.add_space(8.0);

    let occupations = &summary.segmentation.top_occupations;
    let bars = count_bars(occupations, &palette_for(occupations));
    bar_chart(ui, "segment_occupations", "Top Occupations", "Respondents", &bars);
}

fn competition(ui: &mut Ui, summary: &DashboardSummary, brand_colors: &ColorMap) {
    let c = &summary.competition;

    ui.columns(c.brands.len().max(1), |cols| {
        for (col, b) in cols.iter_mut().zip(&c.brands) {
            metric_card(
                col,
                &pct(b.awareness),
                &format!("{} Awareness", b.brand),
                brand_colors.color_for(&b.brand),
            );
        }
    });
    ui.add_space(8.0);

    let usage: Vec<BarItem> = c
        .brands
        .iter()
        .map(|b| BarItem {
            label: b.brand.clone(),
            value: b.usage.unwrap_or(0.0),
            color: brand_colors.color_for(&b.brand),
        })
        .collect();
    bar_chart(ui, "competition_usage", "Laboratory Usage Rates", "Usage (%)", &usage);
    ui.add_space(8.0);

    ui.strong("Threat Assessment");
    if !c.threats.is_empty() {
        ui.columns(c.threats.len(), |cols| {
            for (col, t) in cols.iter_mut().zip(&c.threats) {
                metric_card(
                    col,
                    &format!("{:.1}", t.score),
                    &format!("{} · {} threat", t.brand, t.level),
                    threat_color(t.level),
                );
            }
        });
    }
    ui.add_space(8.0);

    ui.strong("Competitive Health");
    ui.columns(4, |cols| {
        let health = c.health_score.unwrap_or(0.0);
        metric_card(
            &mut cols[0],
            &number(c.health_score, "/100"),
            "Brand Health Score",
            score_color(health, 70.0, 50.0),
        );
        let gap = c.awareness_gap.unwrap_or(0.0);
        metric_card(
            &mut cols[1],
            &number(c.awareness_gap, " pts"),
            "Awareness Lead",
            score_color(gap, 10.0, 0.0),
        );
        metric_card(&mut cols[2], &pct(c.market_position), "Market Position Index", NAVY);
        let growth = c.growth_potential.unwrap_or(0.0);
        metric_card(
            &mut cols[3],
            &pct(c.growth_potential),
            "Growth Potential",
            score_color(growth, 20.0, 10.0),
        );
    });
}

fn strategy(ui: &mut Ui, summary: &DashboardSummary) {
    let s = &summary.strategy;
    ui.columns(2, |cols| {
        metric_card(&mut cols[0], &number(s.satisfaction, "/5"), "Customer Satisfaction", NAVY);
        let priority = s
            .improvements
            .first()
            .map_or_else(|| "n/a".to_string(), |c| c.label.clone());
        metric_card(&mut cols[1], &priority, "Top Improvement Priority", BLUE);
    });
    ui.add_space(8.0);

    let strengths = count_bars(&s.strengths, &palette_for(&s.strengths));
    let improvements = count_bars(&s.improvements, &palette_for(&s.improvements));
    ui.columns(2, |cols| {
        bar_chart(
            &mut cols[0],
            "strategy_strengths",
            "Strengths & Beliefs",
            "Respondents",
            &strengths,
        );
        bar_chart(
            &mut cols[1],
            "strategy_improvements",
            "Areas Needing Improvement",
            "Respondents",
            &improvements,
        );
    });
}

// ---------------------------------------------------------------------------
// Raw data preview
// ---------------------------------------------------------------------------

fn raw_data(ui: &mut Ui, state: &AppState) {
    let Some(dataset) = &state.dataset else {
        return;
    };
    let columns = &dataset.schema.columns;
    ui.strong("Raw Data Preview");

    ui.push_id("raw_data_table", |ui: &mut Ui| {
        egui::ScrollArea::horizontal().show(ui, |ui: &mut Ui| {
            TableBuilder::new(ui)
                .striped(true)
                .max_scroll_height(300.0)
                .columns(Column::auto().at_least(60.0), columns.len())
                .header(20.0, |mut header| {
                    for col in columns {
                        header.col(|ui| {
                            ui.strong(col);
                        });
                    }
                })
                .body(|body| {
                    body.rows(18.0, state.visible_indices.len(), |mut row| {
                        let response = &dataset.rows[state.visible_indices[row.index()]];
                        for col in columns {
                            row.col(|ui| {
                                ui.label(display_value(response.get(col)));
                            });
                        }
                    });
                });
        });
    });
}

//! The spend vs goal bar chart.

use charming::{
    Chart,
    component::{Axis, Grid, Legend, Title},
    element::{AxisLabel, AxisPointer, AxisPointerType, AxisType, JsFunction, Tooltip, Trigger},
    series::bar::Bar,
};
use maud::PreEscaped;
use rust_decimal::{Decimal, prelude::ToPrimitive};

use crate::{html::HeadElement, stats::core::StatsSummary};

/// The HTML element ID the chart is drawn into.
pub(super) const CHART_ID: &str = "spend-vs-goal-chart";

/// Build a grouped bar chart with one pair of bars per category.
pub(super) fn spend_vs_goal_chart(summary: &StatsSummary) -> Chart {
    let spent = chart_values(summary, |name| summary.spending_by_category.get(name));
    let goals = chart_values(summary, |name| summary.goals_by_category.get(name));

    Chart::new()
        .title(
            Title::new()
                .text("Spending vs goals")
                .subtext(format!("{}/{}", summary.month, summary.year)),
        )
        .tooltip(
            Tooltip::new()
                .trigger(Trigger::Axis)
                .value_formatter(currency_formatter())
                .axis_pointer(AxisPointer::new().type_(AxisPointerType::Shadow)),
        )
        .legend(Legend::new().left(250).top("1%"))
        .grid(
            Grid::new()
                .left("3%")
                .right("4%")
                .bottom("3%")
                .top(80)
                .contain_label(true),
        )
        .x_axis(
            Axis::new()
                .type_(AxisType::Category)
                .data(summary.categories.clone()),
        )
        .y_axis(
            Axis::new()
                .type_(AxisType::Value)
                .axis_label(AxisLabel::new().formatter(currency_formatter())),
        )
        .series(Bar::new().name("Spent").data(spent))
        .series(Bar::new().name("Goal").data(goals))
}

// Categories without a value are drawn as zero.
fn chart_values<'a>(
    summary: &'a StatsSummary,
    lookup: impl Fn(&str) -> Option<&'a Decimal>,
) -> Vec<f64> {
    summary
        .categories
        .iter()
        .map(|name| {
            lookup(name)
                .and_then(|amount| amount.to_f64())
                .unwrap_or(0.0)
        })
        .collect()
}

fn currency_formatter() -> JsFunction {
    JsFunction::new_with_args(
        "number",
        "const currencyFormatter = new Intl.NumberFormat('en-US', {
              style: 'currency',
              currency: 'USD'
            });
            return (number) ? currencyFormatter.format(number) : \"-\";",
    )
}

/// The script that draws `chart` once the page has loaded.
pub(super) fn chart_script(chart: &Chart) -> HeadElement {
    HeadElement::ScriptSource(PreEscaped(format!(
        r#"document.addEventListener('DOMContentLoaded', function() {{
            const chart = echarts.init(document.getElementById("{CHART_ID}"));
            chart.setOption({chart});
            window.addEventListener('resize', chart.resize);

            const darkModeMediaQuery = window.matchMedia('(prefers-color-scheme: dark)');
            const updateTheme = () => {{
                chart.setTheme(darkModeMediaQuery.matches ? 'dark' : 'default');
            }};
            darkModeMediaQuery.addEventListener('change', updateTheme);
            updateTheme();
        }});"#
    )))
}

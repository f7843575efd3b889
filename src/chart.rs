//! Grouped bar chart description for the activity panel.
//!
//! The descriptor follows the Chart.js config layout so any renderer that
//! understands that shape can draw it; the dashboard page draws it as SVG.

use serde::Serialize;

pub const CHART_TITLE: &str = "WhatsApp Group Chat Analytics (Last 7 Days)";
pub const ACTIVE_USERS_LABEL: &str = "Active Users";
pub const NEW_USERS_LABEL: &str = "New Users";

const ACTIVE_USERS_COLOR: &str = "rgba(54, 162, 235, 0.7)";
const NEW_USERS_COLOR: &str = "rgba(255, 159, 64, 0.7)";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChartDescriptor {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub data: ChartData,
    pub options: ChartOptions,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChartData {
    pub labels: Vec<String>,
    pub datasets: Vec<Dataset>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    pub label: &'static str,
    pub data: Vec<u64>,
    pub background_color: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChartOptions {
    pub responsive: bool,
    pub plugins: ChartPlugins,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChartPlugins {
    pub legend: Legend,
    pub title: Title,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Legend {
    pub display: bool,
    pub position: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Title {
    pub display: bool,
    pub text: &'static str,
}

/// Series are copied as given. Keeping them aligned with `dates` is up to the caller.
pub fn build_chart(dates: &[String], active_users: &[u64], new_users: &[u64]) -> ChartDescriptor {
    ChartDescriptor {
        kind: "bar",
        data: ChartData {
            labels: dates.to_vec(),
            datasets: vec![
                Dataset {
                    label: ACTIVE_USERS_LABEL,
                    data: active_users.to_vec(),
                    background_color: ACTIVE_USERS_COLOR,
                },
                Dataset {
                    label: NEW_USERS_LABEL,
                    data: new_users.to_vec(),
                    background_color: NEW_USERS_COLOR,
                },
            ],
        },
        options: ChartOptions {
            responsive: true,
            plugins: ChartPlugins {
                legend: Legend {
                    display: true,
                    position: "top",
                },
                title: Title {
                    display: true,
                    text: CHART_TITLE,
                },
            },
        },
    }
}

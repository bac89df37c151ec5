use serde::{Deserialize, Serialize};

const CHARTJS_PALETTE: [&str; 7] = [
    "#36A2EB", "#FF6384", "#4BC0C0", "#FF9F40", "#9966FF", "#FFCD56", "#C9CBCF",
];

const MODERN_PALETTE: [&str; 8] = [
    "#4E79A7", "#F28E2B", "#E15759", "#76B7B2", "#59A14F", "#EDC948", "#B07AA1", "#FF9DA7",
];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    pub font_family: String,
    pub font_size: f32,
    pub font_style: String,
    pub palette: Vec<String>,
    pub slice_border_color: String,
    pub slice_border_width: f32,
    pub background: String,
}

impl Theme {
    pub fn chartjs() -> Self {
        Self {
            font_family: "'Helvetica Neue', 'Helvetica', 'Arial', sans-serif".to_string(),
            font_size: 12.0,
            font_style: "normal".to_string(),
            palette: CHARTJS_PALETTE.iter().map(|c| c.to_string()).collect(),
            slice_border_color: "#FFFFFF".to_string(),
            slice_border_width: 2.0,
            background: "#FFFFFF".to_string(),
        }
    }

    pub fn modern() -> Self {
        Self {
            font_family: "Inter, Segoe UI, system-ui, -apple-system, sans-serif".to_string(),
            font_size: 13.0,
            font_style: "normal".to_string(),
            palette: MODERN_PALETTE.iter().map(|c| c.to_string()).collect(),
            slice_border_color: "#F8FAFF".to_string(),
            slice_border_width: 1.5,
            background: "#FFFFFF".to_string(),
        }
    }

    pub fn slice_color(&self, index: usize) -> &str {
        if self.palette.is_empty() {
            return "#C9CBCF";
        }
        self.palette[index % self.palette.len()].as_str()
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::chartjs()
    }
}

/// QR code model
///
/// QR codes link a printed code to a digital menu. Rendering and view counting
/// happen elsewhere; this is only the record shape returned by the backend.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// QR error correction level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ErrorCorrection {
    L,
    #[default]
    M,
    Q,
    H,
}

/// Visual parameters of a QR code
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QrDesign {
    /// Module color, hex (e.g. `#000000`)
    #[serde(default = "default_foreground")]
    pub foreground: String,

    /// Background color, hex
    #[serde(default = "default_background")]
    pub background: String,

    /// Rendered size in pixels
    #[serde(default = "default_size")]
    pub size: u32,

    #[serde(default)]
    pub error_correction: ErrorCorrection,

    /// Optional centered logo
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
}

fn default_foreground() -> String {
    "#000000".to_string()
}

fn default_background() -> String {
    "#FFFFFF".to_string()
}

fn default_size() -> u32 {
    256
}

impl Default for QrDesign {
    fn default() -> Self {
        Self {
            foreground: default_foreground(),
            background: default_background(),
            size: default_size(),
            error_correction: ErrorCorrection::default(),
            logo_url: None,
        }
    }
}

/// QR code row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QrCode {
    pub id: Uuid,

    /// Menu the code resolves to
    pub menu_id: Uuid,

    pub owner_id: Uuid,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub design: QrDesign,

    /// Scan counter maintained by the backend
    #[serde(default)]
    pub views: i64,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

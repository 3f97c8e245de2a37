pub mod rewrite;
pub mod serialization;
pub mod settings;
pub mod summary;

pub use rewrite::{RewriteOutcome, rewrite_file, rewrite_source};
pub use settings::{
    Number, SettingValue, Settings, SettingsExtraction, extract_settings, parse_settings,
};
pub use summary::{
    key_setting_statuses, missing_key_settings, render_json_report, render_rewrite_summary,
    render_settings_summary,
};

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use clap::Args;
use scene::{FitOptions, DEFAULT_IMAGE_PREFIX};

pub const DEFAULT_GEOCODE_URL: &str = "https://api.bigdatacloud.net/data/reverse-geocode-client";

/// Command-line overrides. Anything left unset falls back to the
/// `RELIABILITY_*` environment variables, then to built-in defaults.
#[derive(Args, Debug, Default, Clone)]
pub struct ConfigArgs {
    /// Point collection (GeoJSON FeatureCollection)
    #[arg(long, global = true)]
    pub data: Option<PathBuf>,

    /// Directory holding the companion images
    #[arg(long, global = true)]
    pub assets_root: Option<PathBuf>,

    /// URL prefix companion image paths are built under
    #[arg(long, global = true)]
    pub image_prefix: Option<String>,

    /// Reverse-geocoding endpoint
    #[arg(long, global = true)]
    pub geocode_url: Option<String>,

    /// Show a marker for every n-th point
    #[arg(long, global = true)]
    pub marker_stride: Option<usize>,

    /// Padding around the data extent when fitting, in pixels
    #[arg(long, global = true)]
    pub fit_padding: Option<u32>,

    /// Highest zoom a data fit may reach
    #[arg(long, global = true)]
    pub fit_max_zoom: Option<f64>,

    /// Reverse-geocode timeout in milliseconds
    #[arg(long, global = true)]
    pub geocode_timeout_ms: Option<u64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ViewerConfig {
    pub data: PathBuf,
    pub assets_root: PathBuf,
    pub image_prefix: String,
    pub geocode_url: String,
    pub marker_stride: usize,
    pub fit: FitOptions,
    pub geocode_timeout: Duration,
}

impl ViewerConfig {
    pub fn from_env(args: ConfigArgs) -> Self {
        Self::resolve(args, |key| env::var(key).ok())
    }

    fn resolve(args: ConfigArgs, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let fit = FitOptions::default();
        Self {
            data: args
                .data
                .unwrap_or_else(|| env_var_path(&lookup, "RELIABILITY_DATA", "data/predictions.geojson")),
            assets_root: args
                .assets_root
                .unwrap_or_else(|| env_var_path(&lookup, "RELIABILITY_ASSETS_ROOT", "data/gcp-imgs")),
            image_prefix: args.image_prefix.unwrap_or_else(|| {
                env_var_string(&lookup, "RELIABILITY_IMAGE_PREFIX", DEFAULT_IMAGE_PREFIX)
            }),
            geocode_url: args.geocode_url.unwrap_or_else(|| {
                env_var_string(&lookup, "RELIABILITY_GEOCODE_URL", DEFAULT_GEOCODE_URL)
            }),
            marker_stride: args
                .marker_stride
                .unwrap_or_else(|| env_var_parsed(&lookup, "RELIABILITY_MARKER_STRIDE", 2)),
            fit: FitOptions {
                padding_px: args.fit_padding.unwrap_or_else(|| {
                    env_var_parsed(&lookup, "RELIABILITY_FIT_PADDING", fit.padding_px)
                }),
                max_zoom: args
                    .fit_max_zoom
                    .filter(|z| z.is_finite())
                    .unwrap_or_else(|| {
                        env_var_finite(&lookup, "RELIABILITY_FIT_MAX_ZOOM", fit.max_zoom)
                    }),
            },
            geocode_timeout: Duration::from_millis(args.geocode_timeout_ms.unwrap_or_else(|| {
                env_var_parsed(&lookup, "RELIABILITY_GEOCODE_TIMEOUT_MS", 5_000)
            })),
        }
    }
}

fn env_var_string(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: &str) -> String {
    lookup(key)
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn env_var_path(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: &str) -> PathBuf {
    PathBuf::from(env_var_string(lookup, key, default))
}

fn env_var_parsed<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T {
    lookup(key)
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

fn env_var_finite(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: f64) -> f64 {
    Some(env_var_parsed(lookup, key, default))
        .filter(|v| v.is_finite())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::{ConfigArgs, ViewerConfig, DEFAULT_GEOCODE_URL};
    use std::collections::HashMap;
    use std::path::PathBuf;
    use std::time::Duration;

    fn resolve(args: ConfigArgs, vars: &[(&str, &str)]) -> ViewerConfig {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ViewerConfig::resolve(args, |key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_without_env() {
        let config = resolve(ConfigArgs::default(), &[]);
        assert_eq!(config.image_prefix, "/gcp-imgs");
        assert_eq!(config.geocode_url, DEFAULT_GEOCODE_URL);
        assert_eq!(config.marker_stride, 2);
        assert_eq!(config.fit.padding_px, 32);
        assert_eq!(config.fit.max_zoom, 10.0);
        assert_eq!(config.geocode_timeout, Duration::from_millis(5_000));
    }

    #[test]
    fn env_fills_gaps_and_args_win() {
        let args = ConfigArgs {
            marker_stride: Some(5),
            ..Default::default()
        };
        let config = resolve(
            args,
            &[
                ("RELIABILITY_MARKER_STRIDE", "3"),
                ("RELIABILITY_FIT_PADDING", "48"),
                ("RELIABILITY_ASSETS_ROOT", "/srv/imgs"),
                ("RELIABILITY_FIT_MAX_ZOOM", "not-a-number"),
            ],
        );
        assert_eq!(config.marker_stride, 5);
        assert_eq!(config.fit.padding_px, 48);
        assert_eq!(config.assets_root, PathBuf::from("/srv/imgs"));
        assert_eq!(config.fit.max_zoom, 10.0);
    }

    #[test]
    fn non_finite_max_zoom_is_ignored() {
        let config = resolve(ConfigArgs::default(), &[("RELIABILITY_FIT_MAX_ZOOM", "NaN")]);
        assert_eq!(config.fit.max_zoom, 10.0);

        let args = ConfigArgs {
            fit_max_zoom: Some(f64::NAN),
            ..Default::default()
        };
        let config = resolve(args, &[("RELIABILITY_FIT_MAX_ZOOM", "12")]);
        assert_eq!(config.fit.max_zoom, 12.0);

        let args = ConfigArgs {
            fit_max_zoom: Some(f64::INFINITY),
            ..Default::default()
        };
        assert_eq!(resolve(args, &[]).fit.max_zoom, 10.0);
    }
}

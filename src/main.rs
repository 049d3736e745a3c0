//! `warehouse3d [DATA] [--config FILE] [--theme FILE]`
//!
//! Opens a window showing the warehouse described by `DATA`
//! (`assets/json/all.json` by default).

use std::path::PathBuf;

use anyhow::{bail, Context};
use log::info;
use warehouse3d::{
    app::WarehouseApp,
    config::{MapOptions, WarehouseConfig},
    map::SelectionEvent,
    model::Warehouse,
    theme::Theme,
};

const DEFAULT_DATA: &str = "assets/json/all.json";

#[derive(Debug, PartialEq)]
struct Args {
    data: PathBuf,
    config: Option<PathBuf>,
    theme: Option<PathBuf>,
}

fn parse_args(mut args: impl Iterator<Item = String>) -> anyhow::Result<Args> {
    let mut data = None;
    let mut config = None;
    let mut theme = None;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => {
                config = Some(args.next().context("--config needs a file")?.into());
            }
            "--theme" => {
                theme = Some(args.next().context("--theme needs a file")?.into());
            }
            flag if flag.starts_with("--") => bail!("unknown option '{flag}'"),
            _ if data.is_none() => data = Some(PathBuf::from(arg)),
            _ => bail!("unexpected argument '{arg}'"),
        }
    }

    Ok(Args {
        data: data.unwrap_or_else(|| PathBuf::from(DEFAULT_DATA)),
        config,
        theme,
    })
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = parse_args(std::env::args().skip(1))?;

    let config = match &args.config {
        Some(path) => WarehouseConfig::from_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => WarehouseConfig::default(),
    };
    let theme = match &args.theme {
        Some(path) => {
            Theme::from_file(path).with_context(|| format!("loading theme {}", path.display()))?
        }
        None => Theme::default(),
    };

    let warehouse = Warehouse::load(&args.data)
        .with_context(|| format!("loading warehouse {}", args.data.display()))?;

    let mut app = WarehouseApp::new(MapOptions::default().with_config(config).with_theme(theme))
        .context("creating the event loop")?;
    app.load(&warehouse).context("drawing the warehouse")?;

    let map = app.map_mut();
    map.set_selection_listener(|event| match event {
        SelectionEvent::Stack {
            id,
            shelf_id,
            shelf_level,
            ..
        } => info!(
            "selected stack {} on shelf {} level {shelf_level}",
            id.as_deref().unwrap_or("?"),
            shelf_id.as_deref().unwrap_or("?")
        ),
        SelectionEvent::ShelfLevel { shelf_id, level, .. } => info!(
            "selected level {level} of shelf {}",
            shelf_id.as_deref().unwrap_or("?")
        ),
        SelectionEvent::Other { node } => info!("selected node {}", node.index()),
    });
    map.set_ground_listener(|point| {
        info!("ground clicked at ({:.1}, {:.1}, {:.1})", point.x, point.y, point.z)
    });

    app.run().context("running the viewer")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> anyhow::Result<Args> {
        parse_args(args.iter().map(|s| s.to_string()))
    }

    #[test]
    fn data_defaults_to_bundled_sample() {
        let args = parse(&[]).unwrap();
        assert_eq!(args.data, PathBuf::from(DEFAULT_DATA));
        assert!(args.config.is_none() && args.theme.is_none());
    }

    #[test]
    fn options_in_any_order() {
        let args = parse(&["--theme", "dark.json", "plan.json", "--config", "c.json"]).unwrap();
        assert_eq!(
            args,
            Args {
                data: "plan.json".into(),
                config: Some("c.json".into()),
                theme: Some("dark.json".into()),
            }
        );
    }

    #[test]
    fn rejects_bad_arguments() {
        assert!(parse(&["--config"]).is_err());
        assert!(parse(&["--verbose"]).is_err());
        assert!(parse(&["a.json", "b.json"]).is_err());
    }
}

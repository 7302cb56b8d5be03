use anyhow::Result;
use clap::{Arg, ArgMatches, Command};
use notify_debouncer_mini::{DebounceEventResult, new_debouncer};
use std::{path::PathBuf, time::Duration};
use walkdir::WalkDir;

use ember_core::SiteConfig;
use ember_dev_server::{DevServer, DevServerConfig, inject_reload_script};

use crate::config::EmberConfig;

pub fn make_subcommand() -> Command {
    crate::cmd::build::add_build_args(Command::new("serve"))
        .about("Serve the site locally with live reload")
        .arg(
            Arg::new("port")
                .short('p')
                .long("port")
                .value_name("PORT")
                .help("Port to serve on [default: 3000]"),
        )
        .arg(
            Arg::new("host")
                .long("host")
                .value_name("HOST")
                .help("Host to bind to [default: 127.0.0.1]"),
        )
        .arg(
            Arg::new("open")
                .long("open")
                .help("Open the browser automatically")
                .action(clap::ArgAction::SetTrue),
        )
}

pub async fn execute(args: &ArgMatches) -> Result<()> {
    let config = EmberConfig::load(args)?;

    rebuild(&config)?;

    let build = config.build.clone();
    let server = DevServer::new(DevServerConfig {
        host: build.host.clone(),
        port: build.port,
        root: PathBuf::from(&build.output),
        open: build.open,
        ignore: vec![".git".to_string(), "*.tmp".to_string()],
    });
    let server_handle = tokio::spawn(async move {
        if let Err(e) = server.run().await {
            eprintln!("Dev server error: {}", e);
        }
    });

    let watcher_config = config.clone();
    let watcher_handle = tokio::spawn(async move {
        if let Err(e) = watch_sources(watcher_config).await {
            eprintln!("Source watcher error: {}", e);
        }
    });

    let _ = tokio::try_join!(server_handle, watcher_handle)?;

    Ok(())
}

// Build, then splice the reload client into every emitted page.
fn rebuild(config: &EmberConfig) -> Result<()> {
    crate::cmd::build::run(config)?;

    let build = &config.build;
    for entry in WalkDir::new(&build.output)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| {
            e.path().is_file() && e.path().extension().map(|ext| ext == "html").unwrap_or(false)
        })
    {
        let html = std::fs::read_to_string(entry.path())?;
        let injected = inject_reload_script(&html, &build.host, build.port);
        std::fs::write(entry.path(), injected)?;
    }

    Ok(())
}

async fn watch_sources(config: EmberConfig) -> Result<()> {
    let build = config.build.clone();
    let source_root = PathBuf::from(&build.source);
    let manifest_path = PathBuf::from(&build.manifest);

    let site_config = if manifest_path.exists() {
        SiteConfig::read(&manifest_path)?
    } else {
        SiteConfig::default()
    };

    // Watch every declared content source plus the theme, the manifest and
    // the metadata file. Output changes are the dev server's watcher's job.
    let mut watch_paths: Vec<PathBuf> = Vec::new();
    for source in site_config.sources()? {
        watch_paths.push(source_root.join(&source.path));
    }
    watch_paths.push(PathBuf::from(&build.theme));
    watch_paths.push(manifest_path);
    if site_config.metadata.is_absolute() {
        watch_paths.push(site_config.metadata.clone());
    } else {
        watch_paths.push(source_root.join(&site_config.metadata));
    }

    let (tx, mut rx) = tokio::sync::mpsc::channel(100);

    let mut debouncer = new_debouncer(
        Duration::from_millis(500),
        move |res: DebounceEventResult| {
            if let Ok(events) = res {
                for event in events {
                    let _ = tx.blocking_send(event.path);
                }
            }
        },
    )?;

    for path in &watch_paths {
        if !path.exists() {
            continue;
        }
        let mode = if path.is_dir() {
            notify::RecursiveMode::Recursive
        } else {
            notify::RecursiveMode::NonRecursive
        };
        debouncer.watcher().watch(path, mode)?;
        println!("Watching: {}", path.display());
    }

    while let Some(path) = rx.recv().await {
        println!("Changed: {}", path.display());
        match rebuild(&config) {
            Ok(()) => println!("Site rebuilt"),
            Err(e) => eprintln!("Build error: {}", e),
        }
    }

    Ok(())
}

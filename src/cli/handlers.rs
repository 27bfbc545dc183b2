// FILE: src/cli/handlers.rs
use crate::{
    cli::{FormCli, OutputFormat},
    fill_layout, read_payload_file, Dialog, FillOptions, FilledForm, FormError, FormKind, PageLayout,
    PayloadStatus, Result,
};

use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::sync::mpsc::channel;

fn required<'a>(matches: &'a clap::ArgMatches, name: &str) -> Result<&'a String> {
    matches
        .get_one::<String>(name)
        .ok_or_else(|| FormError::invalid_format(format!("Missing argument: {}", name)))
}

fn form_kind(matches: &clap::ArgMatches) -> Result<FormKind> {
    required(matches, "form")?.parse()
}

// --- FORMS ---
pub fn handle_forms_command() -> Result<()> {
    println!("📋 Supported forms:");
    for kind in FormKind::ALL {
        let config = kind.config();
        println!(
            "   {:<24} {:<36} {} item slot(s)",
            kind.form_type(),
            config.form_id,
            config.fixed_item_count
        );
    }
    Ok(())
}

// --- CONFIG ---
pub fn handle_config_command(matches: &clap::ArgMatches) -> Result<()> {
    let kind = form_kind(matches)?;
    let json = serde_json::to_string_pretty(kind.config())
        .map_err(|e| FormError::invalid_format(format!("JSON serialization error: {}", e)))?;
    println!("{}", json);
    Ok(())
}

// --- FILL ---
struct FillJob {
    kind: FormKind,
    layout_path: Option<PathBuf>,
    payload_path: Option<PathBuf>,
    options: FillOptions,
    format: OutputFormat,
}

impl FillJob {
    fn layout(&self) -> Result<PageLayout> {
        let mut layout = match &self.layout_path {
            Some(path) => PageLayout::load(path)?,
            None => PageLayout::scaffold(self.kind),
        };
        if let Some(path) = &self.payload_path {
            layout.payload = Some(read_payload_file(path)?);
        }
        Ok(layout)
    }

    fn run(&self) -> Result<FilledForm> {
        let filled = fill_layout(self.kind, &self.layout()?, &self.options)?;
        print_filled_form(&filled, self.format)?;
        Ok(filled)
    }

    fn watched_paths(&self) -> Vec<&Path> {
        [&self.layout_path, &self.payload_path]
            .into_iter()
            .flatten()
            .map(PathBuf::as_path)
            .collect()
    }
}

pub fn handle_fill_command(cli: &FormCli, matches: &clap::ArgMatches) -> Result<()> {
    let kind = form_kind(matches)?;
    let layout_path = matches
        .get_one::<String>("layout")
        .map(PathBuf::from)
        .or_else(|| cli.config().layout_for(kind.form_type()));

    let job = FillJob {
        kind,
        layout_path,
        payload_path: matches.get_one::<String>("payload").map(PathBuf::from),
        options: cli.build_fill_options(matches)?,
        format: cli.output_format(matches)?,
    };

    if matches.get_flag("watch") {
        watch_and_fill(&job)
    } else {
        job.run().map(|_| ())
    }
}

fn watch_and_fill(job: &FillJob) -> Result<()> {
    let paths = job.watched_paths();
    if paths.is_empty() {
        return Err(FormError::invalid_format("--watch needs a --layout or --payload file"));
    }

    let (tx, rx) = channel();
    let mut watcher = RecommendedWatcher::new(
        move |res: notify::Result<Event>| {
            if let Ok(event) = res {
                if let Err(e) = tx.send(event) {
                    eprintln!("Watch error: {}", e);
                }
            }
        },
        notify::Config::default(),
    )
    .map_err(|e| {
        FormError::Io(std::io::Error::new(
            std::io::ErrorKind::Other,
            format!("Failed to create file watcher: {}", e),
        ))
    })?;

    for path in &paths {
        println!("👀 Watching {} for changes...", path.display());
        watcher.watch(path, RecursiveMode::NonRecursive).map_err(|e| {
            FormError::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                format!("Failed to watch {}: {}", path.display(), e),
            ))
        })?;
    }

    if let Err(e) = job.run() {
        eprintln!("❌ Initial fill failed: {}", e);
    }

    loop {
        match rx.recv() {
            Ok(event) if event.kind.is_modify() || event.kind.is_create() => {
                println!("🔄 File changed, refilling...");
                if let Err(e) = job.run() {
                    eprintln!("❌ Fill failed: {}", e);
                }
            }
            Ok(_) => {}
            Err(e) => {
                eprintln!("Watch error: {}", e);
                break;
            }
        }
    }

    Ok(())
}

fn describe_payload(status: &PayloadStatus) -> String {
    match status {
        PayloadStatus::Absent => "absent".to_string(),
        PayloadStatus::Placeholder => "placeholder (no data)".to_string(),
        PayloadStatus::Malformed { message } => format!("malformed ({})", message),
        PayloadStatus::Loaded => "loaded".to_string(),
    }
}

fn print_filled_form(filled: &FilledForm, format: OutputFormat) -> Result<()> {
    if format == OutputFormat::Json {
        let json = serde_json::to_string_pretty(filled)
            .map_err(|e| FormError::invalid_format(format!("JSON serialization error: {}", e)))?;
        println!("{}", json);
        return Ok(());
    }

    let report = &filled.report;
    println!("📝 {} ({})", filled.form_type, report.form_id);
    println!("   Payload: {}", describe_payload(&report.payload));
    println!("   Items loaded: {}", report.items_loaded);
    if report.items_ignored > 0 {
        println!("   Items ignored: {}", report.items_ignored);
    }
    println!("   Grand total: {}", crate::utils::format_fixed0(report.grand_total));
    println!("   Valid: {}", if filled.valid { "yes" } else { "no" });

    println!("\nFields:");
    for field in filled.fields.iter().filter(|field| !field.value.is_empty()) {
        println!("   {} = {}", field.id, field.value);
    }

    if !filled.dialogs.is_empty() {
        println!("\nDialogs:");
        for dialog in &filled.dialogs {
            match dialog {
                Dialog::Alert { message } => println!("   ⚠️  {}", message),
                Dialog::Confirm { message, accepted } => {
                    println!("   ❓ {} -> {}", message, if *accepted { "ok" } else { "cancel" })
                }
            }
        }
    }
    Ok(())
}

// --- SCAFFOLD ---
pub fn handle_scaffold_command(matches: &clap::ArgMatches) -> Result<()> {
    let kind = form_kind(matches)?;
    let layout = PageLayout::scaffold(kind);

    match matches.get_one::<String>("output") {
        Some(output_path) => {
            layout.save(output_path)?;
            println!("✅ Layout for {} written to {}", kind, output_path);
        }
        None => print!("{}", layout.to_toml_string()?),
    }
    Ok(())
}

// --- CHECK ---
pub fn handle_check_command(cli: &FormCli, matches: &clap::ArgMatches) -> Result<()> {
    let input_path = required(matches, "input")?;
    let options = FillOptions {
        today: cli.config().today()?,
        ..Default::default()
    };

    if Path::new(input_path).is_dir() {
        check_directory(input_path, matches.get_flag("recursive"), &options)
    } else {
        check_single_file(Path::new(input_path), &options)
    }
}

fn is_layout_file(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|ext| ext.to_str()),
        Some("toml") | Some("json")
    )
}

fn check_single_file(path: &Path, options: &FillOptions) -> Result<()> {
    println!("🔍 Checking {}", path.display());
    let result = PageLayout::load(path).and_then(|layout| {
        let kind = layout.form_kind().ok_or_else(|| {
            FormError::invalid_format(format!("No registered form uses form id '{}'", layout.form_id))
        })?;
        fill_layout(kind, &layout, options)
    });

    match result {
        Ok(filled) => {
            let alerts = filled
                .dialogs
                .iter()
                .filter(|dialog| matches!(dialog, Dialog::Alert { .. }))
                .count();
            println!(
                "✅ {} - {} item(s), total {}, {} alert(s)",
                path.display(),
                filled.report.items_loaded,
                crate::utils::format_fixed0(filled.report.grand_total),
                alerts
            );
            Ok(())
        }
        Err(e) => {
            println!("❌ {} - {}", path.display(), e);
            Err(e)
        }
    }
}

fn check_directory(dir_path: &str, recursive: bool, options: &FillOptions) -> Result<()> {
    let mut total_files = 0;
    let mut error_files = 0;

    let walker = walkdir::WalkDir::new(dir_path).max_depth(if recursive { usize::MAX } else { 1 });
    for entry in walker {
        let entry = entry.map_err(|e| {
            FormError::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                format!("Directory traversal error: {}", e),
            ))
        })?;
        if entry.file_type().is_file() && is_layout_file(entry.path()) {
            total_files += 1;
            if check_single_file(entry.path(), options).is_err() {
                error_files += 1;
            }
        }
    }

    println!("\n📊 Check Summary:");
    println!("   Total layouts: {}", total_files);
    println!("   Layouts with errors: {}", error_files);
    if total_files > 0 {
        println!(
            "   Success rate: {:.1}%",
            (total_files - error_files) as f64 / total_files as f64 * 100.0
        );
    }

    if error_files > 0 {
        Err(FormError::invalid_format(format!("{} layouts have errors", error_files)))
    } else {
        Ok(())
    }
}

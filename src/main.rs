// src/main.rs

mod app_logic;
mod cli;
mod core;
mod platform_layer;
mod ui_description_layer;

use crate::app_logic::FormController;
use crate::cli::CliArgs;
use crate::core::{
    ConfigManagerOperations, ConversionServiceOperations, CoreConfigManager,
    CoreConversionService, FileDescriptor, ingestion,
};
use crate::platform_layer::{
    AppEvent, ConsolePlatform, FormId, PickerSource, PlatformEventHandler,
};

use clap::Parser;
use simplelog::{ColorChoice, ConfigBuilder, LevelFilter, TermLogger, TerminalMode};
use std::process::ExitCode;
use std::sync::{Arc, Mutex, Once};

static LOGGING_INIT: Once = Once::new();

// Test entry point; every test calls it and only the first call installs the logger.
#[cfg(test)]
pub fn initialize_logging() {
    initialize_logging_with_level(LevelFilter::Debug);
}

/*
 * Sets up terminal logging once per process. Later calls are no-ops.
 */
fn initialize_logging_with_level(level: LevelFilter) {
    LOGGING_INIT.call_once(|| {
        let mut builder = ConfigBuilder::new();
        if builder.set_time_offset_to_local().is_err() {
            // Falls back to UTC timestamps.
            eprintln!("Logging: Could not determine local time offset, using UTC");
        }
        builder
            .set_target_level(LevelFilter::Error)
            .add_filter_ignore_str("reqwest")
            .add_filter_ignore_str("hyper");
        if let Err(e) = TermLogger::init(
            level,
            builder.build(),
            TerminalMode::Mixed,
            ColorChoice::Auto,
        ) {
            eprintln!("Logging: Failed to initialize logger: {e}");
        }
    });
}

const FORM_ID: FormId = FormId(1);

fn main() -> ExitCode {
    let args = CliArgs::parse();
    initialize_logging_with_level(if args.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    });
    log::info!("Application starting up.");

    match run(args) {
        Ok(()) => {
            log::info!("Application exited cleanly.");
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("Application error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: CliArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config_manager: Arc<dyn ConfigManagerOperations> = Arc::new(CoreConfigManager::new());
    let mut config = config_manager
        .load_config(app_logic::handler::APP_NAME)
        .unwrap_or_else(|e| {
            log::warn!("Failed to load configuration: {e}. Using defaults.");
            Default::default()
        });
    if let Some(server) = args.server {
        config.server_base_url = server;
    }
    let conversion_service: Arc<dyn ConversionServiceOperations> =
        Arc::new(CoreConversionService::new(&config)?);

    let controller = FormController::new(
        FORM_ID,
        Arc::clone(&config_manager),
        conversion_service,
    );

    let mut platform = ConsolePlatform::new(FORM_ID, args.out);
    for command in ui_description_layer::build_form_static_layout(FORM_ID) {
        platform.execute_command(command)?;
    }

    let mut script = vec![
        AppEvent::FormReady { form_id: FORM_ID },
        AppEvent::FilesChosen {
            form_id: FORM_ID,
            source: PickerSource::OsDrop,
            files: ingestion::expand_paths(&args.paths),
        },
    ];
    if let Some(template_path) = args.template {
        script.push(AppEvent::FilesChosen {
            form_id: FORM_ID,
            source: PickerSource::TemplatePicker,
            files: vec![FileDescriptor::from_path(&template_path)?],
        });
    }
    if args.img_style {
        script.push(AppEvent::CheckboxToggled {
            form_id: FORM_ID,
            control_id: app_logic::ui_constants::IMAGE_STYLE_CHECKBOX_ID,
            checked: true,
        });
    }
    script.push(AppEvent::SubmitRequested { form_id: FORM_ID });

    let event_handler: Arc<Mutex<dyn PlatformEventHandler>> = Arc::new(Mutex::new(controller));
    platform.run(event_handler, script)?;
    log::debug!("Console front end executed {} command(s)", platform.executed_commands());
    Ok(())
}

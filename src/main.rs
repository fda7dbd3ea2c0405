use clap::Parser;
use threepub::utils::logger::{self, LogOutput};
use threepub::utils::validation::Validate;
use threepub::{
    dump_book, CliConfig, ConsoleScreen, EpubArchive, Keymap, ProcessLauncher, ReaderError,
    ReaderSettings, Result, Viewer,
};

fn run(config: &CliConfig, settings: &ReaderSettings) -> Result<()> {
    let mut archive = EpubArchive::open(&config.epub)?;

    if config.dump {
        let cols = config.cols.or(settings.display.cols);
        let stdout = std::io::stdout();
        let mut out = stdout.lock();
        return dump_book(&mut archive, cols, &mut out);
    }

    let toc = archive.table_of_contents()?;
    let screen = ConsoleScreen::stdout()?;
    let launcher = ProcessLauncher::new(
        settings.programs.editor(),
        settings.programs.image_viewer(),
    );
    let keymap = Keymap::from_config(&settings.keys);

    Viewer::new(archive, toc, screen, launcher, keymap).run()
}

fn report(e: &ReaderError) -> ! {
    // 記錄詳細錯誤信息
    tracing::error!(
        "❌ threepub failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());

    std::process::exit(e.exit_code())
}

fn main() {
    let config = CliConfig::parse();

    // 互動模式下終端機由閱讀器使用，只在指定檔案時記錄日誌
    let log_output = match (&config.log_file, config.dump) {
        (Some(path), _) => LogOutput::File(path.clone()),
        (None, true) => LogOutput::Stderr,
        (None, false) => LogOutput::Disabled,
    };
    logger::init_cli_logger(config.verbose, log_output);

    tracing::info!("Starting threepub");
    tracing::debug!("CLI config: {:?}", config);

    if let Err(e) = config.validate() {
        let e = match e {
            ReaderError::InvalidConfigValueError { ref field, .. } if field == "epub" => {
                ReaderError::NotAnEpub {
                    path: config.epub.clone(),
                }
            }
            other => other,
        };
        report(&e);
    }

    let settings = match ReaderSettings::load(config.config.as_deref()) {
        Ok(settings) => settings,
        Err(e) => report(&e),
    };

    match run(&config, &settings) {
        Ok(()) => tracing::info!("✅ Done"),
        Err(e) => report(&e),
    }
}

use log::LevelFilter;
use once_cell::sync::OnceCell;

static LOGGER: OnceCell<()> = OnceCell::new();

/// Initialize logging for the process.
/// Safe to call more than once; only the first call installs the dispatcher.
pub fn init_logging(level: LevelFilter) {
    LOGGER.get_or_init(|| {
        let result = fern::Dispatch::new()
            .format(|out, message, record| {
                out.finish(format_args!(
                    "[{}] [{}] {}",
                    record.level(),
                    record.target(),
                    message
                ))
            })
            .level(level)
            .chain(std::io::stderr())
            .apply();

        if let Err(err) = result {
            log::warn!("logger already installed: {err}");
        }
    });
}

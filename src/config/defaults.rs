//! Default configuration values

/// Maximum number of download retry attempts
pub const MAX_DOWNLOAD_RETRIES: u32 = 3;

/// Base delay for download retry backoff (in milliseconds)
pub const DOWNLOAD_RETRY_BASE_DELAY_MS: u64 = 1000;

/// Part name used when none is given; the binding installs to `<location>/<name>`
pub const DEFAULT_PART_NAME: &str = "lxml";

/// Python interpreter used to build the binding
pub const DEFAULT_PYTHON: &str = "python3";

/// Options file looked up in the working directory
pub const DEFAULT_OPTIONS_FILE: &str = "staticlxml.toml";

/// Extra configure flag passed to both native libraries
pub const WITHOUT_PYTHON_FLAG: &str = "--without-python";

/// File name `setup.py install --record` writes into the destination
pub const INSTALL_RECORD_FILE: &str = "installed-files.txt";

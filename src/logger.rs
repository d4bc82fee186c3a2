//! Line-oriented console logging shared by every control loop.
//!
//! All macros prefix the message with a colourised level tag and a UTC wall
//! clock timestamp. High-rate per-tick output goes through `event!`, which is
//! silent unless `LOG_PHOENIX_EVENTS` is set.

#[macro_export]
macro_rules! info {
    ($($arg:tt)*) => {
        println!("\x1b[32m[INFO] [{}]\x1b[0m {}", chrono::Utc::now().format("%H:%M:%S%.3f"), format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log {
    ($($arg:tt)*) => {
        println!("\x1b[33m[LOG]  [{}]\x1b[0m {}", chrono::Utc::now().format("%H:%M:%S%.3f"), format!($($arg)*))
    };
}

#[macro_export]
macro_rules! warn {
    ($($arg:tt)*) => {
        println!("\x1b[35m[WARN] [{}]\x1b[0m {}", chrono::Utc::now().format("%H:%M:%S%.3f"), format!($($arg)*))
    };
}

#[macro_export]
macro_rules! error {
    ($($arg:tt)*) => {
        println!("\x1b[31m[ERROR][{}]\x1b[0m {}", chrono::Utc::now().format("%H:%M:%S%.3f"), format!($($arg)*))
    };
}

/// Safety-critical notices: emergency landings, critical failures, threat escalations.
#[macro_export]
macro_rules! alert {
    ($($arg:tt)*) => {
        println!("\x1b[1;31m[ALERT][{}]\x1b[0m {}", chrono::Utc::now().format("%H:%M:%S%.3f"), format!($($arg)*))
    };
}

#[macro_export]
macro_rules! event {
    ($($arg:tt)*) => {
        if std::env::var("LOG_PHOENIX_EVENTS").is_ok() {
            println!("\x1b[36m[EVENT][{}]\x1b[0m {}", chrono::Utc::now().format("%H:%M:%S%.3f"), format!($($arg)*))
        }
    };
}

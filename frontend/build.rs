const FORWARDED: [&str; 3] = [
    "SUPPORT_CHAT_API_BASE",
    "SUPPORT_CHAT_STORAGE_KEY",
    "SUPPORT_CHAT_TIMEOUT_MS",
];

fn main() {
    // Load .env if present (development convenience)
    if let Ok(path) = dotenvy::dotenv() {
        println!("cargo:rerun-if-changed={}", path.display());
    }

    for key in FORWARDED {
        println!("cargo:rerun-if-env-changed={key}");
        if let Ok(value) = std::env::var(key) {
            println!("cargo:rustc-env={key}={value}");
        }
    }
}

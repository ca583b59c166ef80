use dotenvy::dotenv;
use std::env::var;

fn main() {
    dotenv().ok();

    println!("cargo:rustc-check-cfg=cfg(no_key)");
    println!("cargo:rerun-if-env-changed=OPENAI_API_KEY");

    if var("OPENAI_API_KEY").is_err() {
        println!("cargo:rustc-cfg=no_key");
    }
}

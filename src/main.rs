use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    let config_path = finwatch_lib::config_path(std::env::args().nth(1));

    match finwatch_lib::run(&config_path).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            // Tracing may not be up yet
            eprintln!("finwatch: {err:#}");
            ExitCode::FAILURE
        }
    }
}

pub mod cards;
pub mod evolution;
pub mod fitness;
pub mod gameplay;
pub mod genome;
pub mod players;
pub mod save;
pub mod simulation;
pub mod state;

/// dimensional analysis types
pub type Chips = i32;
pub type Points = i32;
pub type Fitness = f64;
pub type Probability = f64;
pub type Seed = u64;

// table parameters
pub const MIN_PLAYERS: usize = 2;
pub const MAX_PLAYERS: usize = 4;
pub const DECK_SIZE: usize = 52;

// simulation parameters
pub const GAME_TIMEOUT_MS: u64 = 100;
pub const ROLLOUT_CAP_FACTOR: usize = 2;
pub const MCTS_PRESETS: [usize; 4] = [100, 500, 1000, 2000];
pub const UCT_EXPLORATION: f64 = std::f64::consts::SQRT_2;

// fitness quality gates
pub const GATE_COMEBACK_FLOOR: Fitness = 0.15;
pub const GATE_SKILL_FLOOR: Fitness = 0.15;
pub const GATE_DOMINANCE_CEILING: Fitness = 0.80;

/// progress bar
pub fn progress(n: usize) -> indicatif::ProgressBar {
    let tick = std::time::Duration::from_secs(60);
    let style = "{spinner:.cyan} {elapsed} ~ {percent:>3}% {wide_bar:.cyan}";
    let style = indicatif::ProgressStyle::with_template(style).unwrap();
    let progress = indicatif::ProgressBar::new(n as u64);
    progress.set_style(style);
    progress.enable_steady_tick(tick);
    progress
}

/// initialize logging to terminal and a timestamped file under logs/
pub fn init() {
    std::fs::create_dir_all("logs").expect("create logs directory");
    let config = simplelog::ConfigBuilder::new()
        .set_location_level(log::LevelFilter::Off)
        .set_target_level(log::LevelFilter::Off)
        .set_thread_level(log::LevelFilter::Off)
        .build();
    let time = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("time moves slow")
        .as_secs();
    let file = simplelog::WriteLogger::new(
        log::LevelFilter::Debug,
        config.clone(),
        std::fs::File::create(format!("logs/{}.log", time)).expect("create log file"),
    );
    let term = simplelog::TermLogger::new(
        log::LevelFilter::Info,
        config.clone(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    );
    simplelog::CombinedLogger::init(vec![term, file]).expect("initialize logger");
}

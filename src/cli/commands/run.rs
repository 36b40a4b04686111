//! Run command - train, checkpoint, then play

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Parser, ValueEnum};

use crate::{
    adapters::CsvRepository,
    cli::output::{format_number, format_per_player, print_kv, print_section},
    games::{GAME_NAMES, load_game},
    pipeline::{
        EvaluationLoop, ExploitabilityEvaluator, GreedyBot, HumanBot, LogObserver,
        ProgressObserver, ReportObserver, StopAtMetric, TrainingConfig, TrainingLoop,
    },
    ports::{ValueLearner, ValueTableRepository},
    q_learning::{SolverConfig, TabularQLearningSolver},
};

/// What happens after training
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PlayMode {
    /// Play one game against the trained agent on stdin/stdout
    Human,
    /// Score the greedy agent against itself
    #[value(name = "self")]
    SelfPlay,
    /// Skip play
    None,
}

#[derive(Parser, Debug)]
#[command(about = "Tabular Q-learning trainer", allow_negative_numbers = true)]
pub struct RunArgs {
    /// Game to train on
    #[arg(long, default_value = "tic_tac_toe")]
    pub game: String,

    /// Episode budget (default 1000; open-ended with --target-exploitability)
    #[arg(long)]
    pub iterations: Option<usize>,

    /// Stop once exploitability reaches this value
    #[arg(long)]
    pub target_exploitability: Option<f64>,

    /// Print exploitability every N episodes (0 disables)
    #[arg(long, default_value_t = TrainingConfig::DEFAULT_EVALUATE_EVERY)]
    pub evaluate_every: usize,

    /// Write a checkpoint every N episodes; the final one is always written
    #[arg(long)]
    pub checkpoint_every: Option<usize>,

    /// Checkpoint file, overwritten on every checkpoint
    #[arg(long, default_value = TrainingConfig::DEFAULT_CHECKPOINT_PATH)]
    pub checkpoint: PathBuf,

    /// Seed the value table from an existing checkpoint
    #[arg(long)]
    pub resume: Option<PathBuf>,

    #[arg(long)]
    pub epsilon: Option<f64>,

    #[arg(long)]
    pub learning_rate: Option<f64>,

    #[arg(long)]
    pub discount_factor: Option<f64>,

    /// Eligibility trace decay; 0 disables traces
    #[arg(long)]
    pub lambda: Option<f64>,

    /// Random seed for reproducibility
    #[arg(long)]
    pub seed: Option<u64>,

    /// What to do after training
    #[arg(long, value_enum, default_value = "human")]
    pub play: PlayMode,

    /// Player index the human controls
    #[arg(long, default_value_t = 0)]
    pub human_player: usize,

    /// Episodes for --play self
    #[arg(long, default_value_t = 1000)]
    pub eval_episodes: usize,

    /// Show a progress bar while training
    #[arg(long)]
    pub progress: bool,

    /// Optional path for writing a summary JSON file
    #[arg(long)]
    pub summary: Option<PathBuf>,
}

impl RunArgs {
    fn solver_config(&self) -> SolverConfig {
        let mut config = SolverConfig::default();
        if let Some(epsilon) = self.epsilon {
            config = config.with_epsilon(epsilon);
        }
        if let Some(learning_rate) = self.learning_rate {
            config = config.with_learning_rate(learning_rate);
        }
        if let Some(discount_factor) = self.discount_factor {
            config = config.with_discount_factor(discount_factor);
        }
        if let Some(lambda) = self.lambda {
            config = config.with_lambda(lambda);
        }
        if let Some(seed) = self.seed {
            config = config.with_seed(seed);
        }
        config
    }

    fn training_config(&self) -> Result<TrainingConfig> {
        let iterations = match (self.iterations, self.target_exploitability) {
            (Some(n), _) => Some(n),
            (None, Some(_)) => None,
            (None, None) => Some(TrainingConfig::DEFAULT_ITERATIONS),
        };
        let evaluate_every = (self.evaluate_every > 0).then_some(self.evaluate_every);
        if iterations.is_none() && evaluate_every.is_none() {
            bail!("--target-exploitability without --iterations needs --evaluate-every above 0");
        }
        let mut config = TrainingConfig::default()
            .with_iterations(iterations)
            .with_evaluate_every(evaluate_every)
            .with_checkpoint_path(&self.checkpoint);
        if let Some(every) = self.checkpoint_every {
            config = config.with_checkpoint_every(every);
        }
        Ok(config)
    }
}

pub fn execute(args: RunArgs) -> Result<()> {
    let game = load_game(&args.game)
        .with_context(|| format!("available games: {}", GAME_NAMES.join(", ")))?;
    let repository = CsvRepository::new();

    let mut solver = TabularQLearningSolver::new(game.clone(), args.solver_config())?;
    if let Some(path) = &args.resume {
        let table = repository
            .load(path)
            .with_context(|| format!("failed to resume from {}", path.display()))?;
        println!("Resumed {} values from {}", format_number(table.len()), path.display());
        solver = solver
            .with_value_table(table.clone())
            .with_info_state_value_table(table);
    }

    let config = args.training_config()?;
    let mut training = TrainingLoop::new(config.clone(), Box::new(repository))
        .with_observer(Box::new(LogObserver));
    if config.evaluate_every.is_some() {
        let evaluator = ExploitabilityEvaluator::new(game.clone())
            .context("failed to enumerate the game's decision states")?;
        training = training
            .with_metric(Box::new(evaluator))
            .with_observer(Box::new(ReportObserver::stdout("exploitability")));
    }
    if let Some(target) = args.target_exploitability {
        training = training.with_observer(Box::new(StopAtMetric::new(target)));
    }
    if args.progress {
        training = training.with_observer(Box::new(ProgressObserver::new()));
    }

    let summary = training.run(&mut solver)?;

    print_section("Training Summary");
    print_kv("Game", game.name());
    print_kv("Episodes", &format_number(summary.episodes));
    print_kv("Values learned", &format_number(summary.table_size));
    print_kv("Checkpoints", &summary.checkpoints.to_string());
    print_kv("Checkpoint file", &config.checkpoint_path.display().to_string());
    print_kv("Mean returns", &format_per_player(&summary.mean_returns));
    if let Some(metric) = summary.final_metric() {
        print_kv("Exploitability", &format!("{metric:.6}"));
    }

    if let Some(path) = &args.summary {
        summary
            .save(path)
            .with_context(|| format!("failed to write summary to {}", path.display()))?;
        println!("\nSummary saved to: {}", path.display());
    }

    let mut evaluation = EvaluationLoop::new(args.seed);
    match args.play {
        PlayMode::None => {}
        PlayMode::SelfPlay => {
            let mut bot = GreedyBot::new(solver.value_table());
            let result = evaluation.self_play(&*game, &mut bot, args.eval_episodes)?;
            print_section("Self-play Evaluation");
            print_kv("Episodes", &format_number(result.episodes));
            print_kv("Total rewards", &format_per_player(&result.total_rewards));
            print_kv("Mean rewards", &format_per_player(&result.mean_rewards));
        }
        PlayMode::Human => {
            if args.human_player >= game.num_players() {
                bail!(
                    "--human-player {} is out of range for {} ({} players)",
                    args.human_player,
                    game.name(),
                    game.num_players()
                );
            }
            let agent_player = if args.human_player == 0 { 1 } else { 0 };
            let mut human = HumanBot::stdio();
            let mut agent = GreedyBot::new(solver.value_table());
            print_section("Interactive Play");
            println!("You are player {}.", args.human_player);
            evaluation.interactive(
                &*game,
                &mut human,
                args.human_player,
                &mut agent,
                agent_player,
                &mut std::io::stdout(),
            )?;
        }
    }

    Ok(())
}

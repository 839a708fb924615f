//! Football league CLI
//!
//! Records teams, players, matches and goals, reconciles submitted results
//! and reports statistics.

use clap::{Parser, Subcommand};
use football::output::Envelope;
use football::data::validation::{PlayerChanges, TeamChanges};
use football::{Config, Result, TeamId};

#[derive(Parser)]
#[command(name = "football")]
#[command(about = "Football match results and statistics", long_about = None)]
struct Cli {
    /// Config file path
    #[arg(short, long, default_value = "football.toml")]
    config: String,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Output format
    #[arg(short, long, default_value = "table", global = true)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a new project with default config
    Init,
    /// Show database status
    Status,
    /// Team management
    Team {
        #[command(subcommand)]
        action: TeamCommands,
    },
    /// Player management
    Player {
        #[command(subcommand)]
        action: PlayerCommands,
    },
    /// Match management and result submission
    Match {
        #[command(subcommand)]
        action: MatchCommands,
    },
    /// Individual goals of a completed match
    Goal {
        #[command(subcommand)]
        action: GoalCommands,
    },
    /// Team and player statistics
    Stats {
        #[command(subcommand)]
        action: StatsCommands,
    },
    /// Report for a completed match
    Report {
        /// Match ID
        id: i64,
    },
}

#[derive(Subcommand)]
enum TeamCommands {
    /// Register a team
    Add {
        name: String,
        #[arg(long)]
        founded: i32,
        #[arg(long)]
        city: String,
        #[arg(long, default_value = "")]
        address: String,
        #[arg(long)]
        logo: Option<String>,
    },
    /// Change a team's details
    Update {
        id: i64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        founded: Option<i32>,
        #[arg(long)]
        city: Option<String>,
        #[arg(long)]
        address: Option<String>,
        #[arg(long)]
        logo: Option<String>,
    },
    /// List live teams
    List,
    /// Delete a team
    Delete { id: i64 },
}

#[derive(Subcommand)]
enum PlayerCommands {
    /// Register a player with a team
    Add {
        /// Owning team ID
        team: i64,
        name: String,
        #[arg(long)]
        jersey: u8,
        /// Forward, Midfielder, Defender or Goalkeeper
        #[arg(long)]
        position: String,
        /// Height in cm
        #[arg(long)]
        height: f64,
        /// Weight in kg
        #[arg(long)]
        weight: f64,
    },
    /// Change a player's details or team
    Update {
        id: i64,
        /// Move to another team
        #[arg(long)]
        team: Option<i64>,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        jersey: Option<u8>,
        #[arg(long)]
        position: Option<String>,
        #[arg(long)]
        height: Option<f64>,
        #[arg(long)]
        weight: Option<f64>,
    },
    /// List players, optionally for one team
    List {
        #[arg(long)]
        team: Option<i64>,
    },
    /// Delete a player
    Delete { id: i64 },
}

#[derive(Subcommand)]
enum MatchCommands {
    /// Schedule a match
    Add {
        /// Home team ID
        home: i64,
        /// Away team ID
        away: i64,
        /// Date (YYYY-MM-DD)
        #[arg(long)]
        date: String,
        /// Kick-off time (HH:MM:SS)
        #[arg(long)]
        time: String,
    },
    /// Reschedule a match or change its teams
    Update {
        id: i64,
        #[arg(long)]
        home: Option<i64>,
        #[arg(long)]
        away: Option<i64>,
        /// Date (YYYY-MM-DD)
        #[arg(long)]
        date: Option<String>,
        /// Kick-off time (HH:MM:SS)
        #[arg(long)]
        time: Option<String>,
    },
    /// List live matches, most recent first
    List,
    /// Show a match with its goals
    Show { id: i64 },
    /// Move a match to Scheduled or Cancelled
    Status { id: i64, status: String },
    /// Delete a match and its goals
    Delete { id: i64 },
    /// Submit the final result of a match
    Result {
        id: i64,
        /// Home score
        #[arg(long)]
        home: u32,
        /// Away score
        #[arg(long)]
        away: u32,
        /// Goal as PLAYER@TIME, repeat once per goal
        #[arg(long = "goal")]
        goals: Vec<String>,
    },
}

#[derive(Subcommand)]
enum GoalCommands {
    /// Record a single goal in a completed match
    Add {
        #[arg(value_name = "MATCH")]
        match_id: i64,
        player: i64,
        time: String,
    },
    /// List the goal timeline of a match
    List {
        #[arg(value_name = "MATCH")]
        match_id: i64,
    },
    /// Withdraw a goal
    Delete { id: i64 },
}

#[derive(Subcommand)]
enum StatsCommands {
    /// Record of a team across completed matches
    Team { id: i64 },
    /// Goals of a player
    Player { id: i64 },
    /// Leading scorers
    TopScorers {
        #[arg(long, allow_negative_numbers = true)]
        limit: Option<i64>,
    },
    /// Wins of a team up to and including a match
    Wins {
        team: i64,
        #[arg(long = "up-to")]
        up_to: i64,
    },
}

#[derive(Clone, Copy, Debug)]
enum OutputFormat {
    Table,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Unknown format: {}. Use table or json.", s)),
        }
    }
}

fn main() {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .format_timestamp(None)
        .init();

    // Load or create config
    let config = if std::path::Path::new(&cli.config).exists() {
        match Config::load(&cli.config) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Error loading config: {}", e);
                std::process::exit(1);
            }
        }
    } else {
        Config::default()
    };

    let out = cli.format;
    let result = match cli.command {
        Commands::Init => commands::init(&cli.config),
        Commands::Status => commands::status(&config, out),
        Commands::Team { action } => match action {
            TeamCommands::Add {
                name,
                founded,
                city,
                address,
                logo,
            } => commands::team_add(&config, out, name, founded, city, address, logo),
            TeamCommands::Update {
                id,
                name,
                founded,
                city,
                address,
                logo,
            } => {
                let changes = TeamChanges {
                    name,
                    founded_year: founded,
                    home_address: address,
                    home_city: city,
                    logo_url: logo,
                };
                commands::team_update(&config, out, id, changes)
            }
            TeamCommands::List => commands::team_list(&config, out),
            TeamCommands::Delete { id } => commands::team_delete(&config, out, id),
        },
        Commands::Player { action } => match action {
            PlayerCommands::Add {
                team,
                name,
                jersey,
                position,
                height,
                weight,
            } => commands::player_add(&config, out, team, name, jersey, &position, height, weight),
            PlayerCommands::Update {
                id,
                team,
                name,
                jersey,
                position,
                height,
                weight,
            } => {
                let changes = PlayerChanges {
                    team_id: team.map(TeamId),
                    name,
                    height,
                    weight,
                    position: None,
                    jersey_number: jersey,
                };
                commands::player_update(&config, out, id, changes, position.as_deref())
            }
            PlayerCommands::List { team } => commands::player_list(&config, out, team),
            PlayerCommands::Delete { id } => commands::player_delete(&config, out, id),
        },
        Commands::Match { action } => match action {
            MatchCommands::Add {
                home,
                away,
                date,
                time,
            } => commands::match_add(&config, out, home, away, &date, &time),
            MatchCommands::Update {
                id,
                home,
                away,
                date,
                time,
            } => commands::match_update(&config, out, id, home, away, date, time),
            MatchCommands::List => commands::match_list(&config, out),
            MatchCommands::Show { id } => commands::match_show(&config, out, id),
            MatchCommands::Status { id, status } => {
                commands::match_status(&config, out, id, &status)
            }
            MatchCommands::Delete { id } => commands::match_delete(&config, out, id),
            MatchCommands::Result {
                id,
                home,
                away,
                goals,
            } => commands::match_result(&config, out, id, home, away, &goals),
        },
        Commands::Goal { action } => match action {
            GoalCommands::Add {
                match_id,
                player,
                time,
            } => commands::goal_add(&config, out, match_id, player, time),
            GoalCommands::List { match_id } => commands::goal_list(&config, out, match_id),
            GoalCommands::Delete { id } => commands::goal_delete(&config, out, id),
        },
        Commands::Stats { action } => match action {
            StatsCommands::Team { id } => commands::stats_team(&config, out, id),
            StatsCommands::Player { id } => commands::stats_player(&config, out, id),
            StatsCommands::TopScorers { limit } => commands::top_scorers(&config, out, limit),
            StatsCommands::Wins { team, up_to } => commands::stats_wins(&config, out, team, up_to),
        },
        Commands::Report { id } => commands::report(&config, out, id),
    };

    if let Err(e) = result {
        log::debug!("Command failed: {:?}", e);
        match out {
            OutputFormat::Json => println!("{}", Envelope::from_error(&e).to_json()),
            OutputFormat::Table => eprintln!("Error: {}", e),
        }
        std::process::exit(1);
    }
}

mod commands {
    use super::*;
    use football::data::validation::{
        current_year, parse_date, parse_time, validate_match, validate_player, validate_team,
        MatchChanges, NewMatch, NewPlayer, NewTeam,
    };
    use football::data::Database;
    use football::league::{
        ReportCompiler, ResultReconciler, ResultSubmission, StatisticsAggregator,
    };
    use football::output;
    use football::{GoalEntry, GoalId, MatchId, MatchStatus, PlayerId, Position};
    use serde::Serialize;
    use std::time::Duration;

    fn open(config: &Config) -> Result<Database> {
        let db = Database::open(&config.data.database_path)?;
        db.set_busy_timeout(Duration::from_millis(config.store.busy_timeout_ms))?;
        Ok(db)
    }

    fn aggregator<'a>(config: &Config, db: &'a Database) -> StatisticsAggregator<'a, Database> {
        StatisticsAggregator::new(db).with_limits(
            config.reports.default_top_scorers,
            config.reports.max_top_scorers,
        )
    }

    /// Print `data` as an envelope or through its text rendering
    fn emit<T: Serialize>(
        out: OutputFormat,
        message: &str,
        data: T,
        render: impl FnOnce(&T) -> String,
    ) {
        match out {
            OutputFormat::Json => println!("{}", Envelope::ok(message, data).to_json()),
            OutputFormat::Table => {
                let text = render(&data);
                if text.ends_with('\n') {
                    print!("{}", text);
                } else {
                    println!("{}", text);
                }
            }
        }
    }

    fn lines<T>(items: &[T], empty: &str, line: impl Fn(&T) -> String) -> String {
        if items.is_empty() {
            return empty.to_string();
        }
        items.iter().map(line).collect::<Vec<_>>().join("\n")
    }

    pub fn init(config_path: &str) -> Result<()> {
        let config = Config::default();
        config.save(config_path)?;
        println!("Created default config at {}", config_path);

        open(&config)?;
        println!("Created database at {}", config.data.database_path);

        println!("\nNext steps:");
        println!("  1. Edit {} to customize settings", config_path);
        println!("  2. Run 'football team add' to register teams");
        println!("  3. Run 'football match add' to schedule matches");
        println!("  4. Run 'football match result' to submit results");

        Ok(())
    }

    pub fn status(config: &Config, out: OutputFormat) -> Result<()> {
        let db = open(config)?;
        let stats = db.get_stats()?;

        emit(out, "Database status", stats, |stats| {
            let mut text = format!(
                "Database Status\n───────────────────────────────\n  Path:       {}\n  Teams:      {}\n  Players:    {}\n  Matches:    {} ({} completed)\n  Goals:      {}",
                config.data.database_path,
                stats.team_count,
                stats.player_count,
                stats.match_count,
                stats.completed_match_count,
                stats.goal_count
            );
            if let (Some(earliest), Some(latest)) = (stats.earliest_match, stats.latest_match) {
                text.push_str(&format!("\n  Range:      {} to {}", earliest, latest));
            }
            text
        });
        Ok(())
    }

    pub fn team_add(
        config: &Config,
        out: OutputFormat,
        name: String,
        founded_year: i32,
        home_city: String,
        home_address: String,
        logo_url: Option<String>,
    ) -> Result<()> {
        let team = NewTeam {
            name,
            founded_year,
            home_address,
            home_city,
            logo_url,
        };
        validate_team(&team, current_year())?;

        let db = open(config)?;
        let team = db.create_team(&team)?;
        emit(out, "Team created", team, output::format_team);
        Ok(())
    }

    pub fn team_update(
        config: &Config,
        out: OutputFormat,
        id: i64,
        changes: TeamChanges,
    ) -> Result<()> {
        let db = open(config)?;
        let team = changes.apply(&db.get_team(TeamId(id))?);
        validate_team(&team, current_year())?;

        let team = db.update_team(TeamId(id), &team)?;
        emit(out, "Team updated", team, output::format_team);
        Ok(())
    }

    pub fn team_list(config: &Config, out: OutputFormat) -> Result<()> {
        let db = open(config)?;
        let teams = db.list_teams()?;
        emit(out, "Teams", teams, |teams| {
            lines(teams, "No teams.", output::format_team)
        });
        Ok(())
    }

    pub fn team_delete(config: &Config, out: OutputFormat, id: i64) -> Result<()> {
        let db = open(config)?;
        db.delete_team(TeamId(id))?;
        emit(out, "Team deleted", TeamId(id), |id| format!("Deleted team {}", id));
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    pub fn player_add(
        config: &Config,
        out: OutputFormat,
        team: i64,
        name: String,
        jersey_number: u8,
        position: &str,
        height: f64,
        weight: f64,
    ) -> Result<()> {
        let player = NewPlayer {
            team_id: TeamId(team),
            name,
            height,
            weight,
            position: position.parse::<Position>()?,
            jersey_number,
        };
        validate_player(&player, &config.vocabulary)?;

        let db = open(config)?;
        let player = db.create_player(&player)?;
        emit(out, "Player created", player, output::format_player);
        Ok(())
    }

    pub fn player_update(
        config: &Config,
        out: OutputFormat,
        id: i64,
        mut changes: PlayerChanges,
        position: Option<&str>,
    ) -> Result<()> {
        changes.position = position.map(str::parse::<Position>).transpose()?;

        let db = open(config)?;
        let player = changes.apply(&db.get_player(PlayerId(id))?);
        validate_player(&player, &config.vocabulary)?;

        let player = db.update_player(PlayerId(id), &player)?;
        emit(out, "Player updated", player, output::format_player);
        Ok(())
    }

    pub fn player_list(config: &Config, out: OutputFormat, team: Option<i64>) -> Result<()> {
        let db = open(config)?;
        let players = db.list_players(team.map(TeamId))?;
        emit(out, "Players", players, |players| {
            lines(players, "No players.", output::format_player)
        });
        Ok(())
    }

    pub fn player_delete(config: &Config, out: OutputFormat, id: i64) -> Result<()> {
        let db = open(config)?;
        db.delete_player(PlayerId(id))?;
        emit(out, "Player deleted", PlayerId(id), |id| {
            format!("Deleted player {}", id)
        });
        Ok(())
    }

    pub fn match_add(
        config: &Config,
        out: OutputFormat,
        home: i64,
        away: i64,
        date: &str,
        time: &str,
    ) -> Result<()> {
        let fixture = NewMatch::parse(date, time, TeamId(home), TeamId(away))?;
        validate_match(&fixture)?;

        let db = open(config)?;
        let record = db.create_match(&fixture)?;
        emit(out, "Match scheduled", record, output::format_match);
        Ok(())
    }

    pub fn match_update(
        config: &Config,
        out: OutputFormat,
        id: i64,
        home: Option<i64>,
        away: Option<i64>,
        date: Option<String>,
        time: Option<String>,
    ) -> Result<()> {
        let changes = MatchChanges {
            date: date.as_deref().map(parse_date).transpose()?,
            time: time.as_deref().map(parse_time).transpose()?,
            home_team_id: home.map(TeamId),
            away_team_id: away.map(TeamId),
        };

        let db = open(config)?;
        let fixture = changes.apply(&db.get_match(MatchId(id))?);
        let record = db.update_match(MatchId(id), &fixture)?;
        emit(out, "Match updated", record, output::format_match);
        Ok(())
    }

    pub fn match_list(config: &Config, out: OutputFormat) -> Result<()> {
        let db = open(config)?;
        let matches = db.list_matches()?;
        emit(out, "Matches", matches, |matches| {
            lines(matches, "No matches.", output::format_match)
        });
        Ok(())
    }

    pub fn match_show(config: &Config, out: OutputFormat, id: i64) -> Result<()> {
        let db = open(config)?;
        let record = db.get_match(MatchId(id))?;
        let goals = ResultReconciler::new(&db).goals(record.id)?;

        #[derive(Serialize)]
        struct MatchView {
            #[serde(flatten)]
            record: football::Match,
            goals: Vec<football::GoalDetail>,
        }

        emit(out, "Match", MatchView { record, goals }, |view| {
            let mut text = output::format_match(&view.record);
            for goal in &view.goals {
                text.push('\n');
                text.push_str(&output::format_goal(goal));
            }
            text
        });
        Ok(())
    }

    pub fn match_status(config: &Config, out: OutputFormat, id: i64, status: &str) -> Result<()> {
        let status = config.vocabulary.check_status(status.parse::<MatchStatus>()?)?;

        let db = open(config)?;
        let record = db.set_match_status(MatchId(id), status)?;
        emit(out, "Match status updated", record, output::format_match);
        Ok(())
    }

    pub fn match_delete(config: &Config, out: OutputFormat, id: i64) -> Result<()> {
        let db = open(config)?;
        db.delete_match(MatchId(id))?;
        emit(out, "Match deleted", MatchId(id), |id| format!("Deleted match {}", id));
        Ok(())
    }

    pub fn match_result(
        config: &Config,
        out: OutputFormat,
        id: i64,
        home: u32,
        away: u32,
        goals: &[String],
    ) -> Result<()> {
        let goals = goals
            .iter()
            .map(|g| g.parse::<GoalEntry>())
            .collect::<Result<Vec<_>>>()?;
        let submission = ResultSubmission::new(home, away, goals);

        let db = open(config)?;
        let record = ResultReconciler::new(&db).reconcile(MatchId(id), &submission)?;
        emit(out, "Result recorded", record, output::format_match);
        Ok(())
    }

    pub fn goal_add(
        config: &Config,
        out: OutputFormat,
        match_id: i64,
        player: i64,
        time: String,
    ) -> Result<()> {
        let db = open(config)?;
        let goal = ResultReconciler::new(&db)
            .record_goal(MatchId(match_id), &GoalEntry::new(PlayerId(player), time))?;
        emit(out, "Goal recorded", goal, output::format_goal);
        Ok(())
    }

    pub fn goal_list(config: &Config, out: OutputFormat, match_id: i64) -> Result<()> {
        let db = open(config)?;
        let goals = ResultReconciler::new(&db).goals(MatchId(match_id))?;
        emit(out, "Goals", goals, |goals| {
            lines(goals, "No goals.", output::format_goal)
        });
        Ok(())
    }

    pub fn goal_delete(config: &Config, out: OutputFormat, id: i64) -> Result<()> {
        let db = open(config)?;
        ResultReconciler::new(&db).withdraw_goal(GoalId(id))?;
        emit(out, "Goal withdrawn", GoalId(id), |id| format!("Withdrew goal {}", id));
        Ok(())
    }

    pub fn stats_team(config: &Config, out: OutputFormat, id: i64) -> Result<()> {
        let db = open(config)?;
        let stats = aggregator(config, &db).team_statistics(TeamId(id))?;
        emit(out, "Team statistics", stats, output::format_team_statistics);
        Ok(())
    }

    pub fn stats_player(config: &Config, out: OutputFormat, id: i64) -> Result<()> {
        let db = open(config)?;
        let stats = aggregator(config, &db).player_statistics(PlayerId(id))?;
        emit(out, "Player statistics", stats, output::format_player_statistics);
        Ok(())
    }

    pub fn top_scorers(config: &Config, out: OutputFormat, limit: Option<i64>) -> Result<()> {
        let db = open(config)?;
        let scorers = aggregator(config, &db).top_scorers(limit)?;
        emit(out, "Top scorers", scorers, |s| output::format_top_scorers(s));
        Ok(())
    }

    pub fn stats_wins(config: &Config, out: OutputFormat, team: i64, up_to: i64) -> Result<()> {
        let db = open(config)?;
        let wins = aggregator(config, &db).team_wins_up_to(TeamId(team), MatchId(up_to))?;

        #[derive(Serialize)]
        struct Wins {
            team_id: TeamId,
            up_to: MatchId,
            wins: u32,
        }

        let data = Wins {
            team_id: TeamId(team),
            up_to: MatchId(up_to),
            wins,
        };
        emit(out, "Team wins", data, |w| {
            format!("Team {} won {} matches up to match {}", w.team_id, w.wins, w.up_to)
        });
        Ok(())
    }

    pub fn report(config: &Config, out: OutputFormat, id: i64) -> Result<()> {
        let db = open(config)?;
        let report = ReportCompiler::new(&db).compile(MatchId(id))?;
        emit(out, "Match report", report, output::format_report);
        Ok(())
    }
}

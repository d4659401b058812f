//! Campus Sweeper entry point
//!
//! Terminal front end: reads one command per line from stdin and prints the
//! board after each one.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast;

use campus_sweeper::Settings;
use campus_sweeper::consts::GRID_SIZE;
use campus_sweeper::haptics::{Haptics, HapticsDriver, LogHaptics, NoHaptics};
use campus_sweeper::report::{CannedReporter, GeminiReporter, ReportGenerator};
use campus_sweeper::runtime::{RuntimeError, SessionHandle, SessionRuntime};
use campus_sweeper::sim::{BombStatus, Scene, Session, Snapshot, is_building_footprint, is_door};

const HELP: &str = "w/a/s/d move, e enter/exit, c defuse, b detonate, q quit";

#[tokio::main]
async fn main() {
    env_logger::init();

    let settings_path = std::env::args().nth(1).map(PathBuf::from);
    let settings = Settings::load_or_default(settings_path.as_deref());
    let seed = settings.effective_seed();
    log::info!("Campus Sweeper starting with seed {}", seed);

    let reporter: Arc<dyn ReportGenerator> = match GeminiReporter::from_settings(&settings.report) {
        Ok(reporter) => Arc::new(reporter),
        Err(e) => {
            log::warn!("Report service unavailable ({e}); using canned reports");
            Arc::new(CannedReporter::default())
        }
    };
    let motor: Box<dyn Haptics> = if settings.haptics {
        Box::new(LogHaptics)
    } else {
        Box::new(NoHaptics)
    };
    let haptics = HapticsDriver::new(motor, settings.haptics);
    let runtime = SessionRuntime::spawn(Session::new(seed), reporter, haptics, &settings);
    let handle = runtime.handle();

    tokio::spawn(forward_reports(handle.subscribe_reports(), |text| {
        println!("\n>> {text}\n")
    }));

    println!("{HELP}");
    println!("{}", render(&handle.snapshot()));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                log::error!("Failed to read input: {e}");
                break;
            }
        };

        let key = line.trim();
        if key == "q" {
            break;
        }
        match run_command(&handle, key).await {
            Ok(true) => println!("{}", render(&handle.snapshot())),
            Ok(false) => println!("{HELP}"),
            Err(e) => {
                log::error!("Command failed: {e}");
                break;
            }
        }
    }

    match runtime.shutdown().await {
        Ok(last) => println!("Final score: {}", last.score),
        Err(e) => log::error!("Shutdown failed: {e}"),
    }
}

/// Hand every report to `emit` until the channel closes. Lagging only
/// skips the reports that were overwritten.
async fn forward_reports(mut reports: broadcast::Receiver<String>, mut emit: impl FnMut(String)) {
    loop {
        match reports.recv().await {
            Ok(text) => emit(text),
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                log::warn!("Report printer fell behind, skipped {skipped} reports");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}

/// `Ok(false)` for unknown input; empty input just redraws
async fn run_command(handle: &SessionHandle, key: &str) -> Result<bool, RuntimeError> {
    match key {
        "w" => handle.move_player(0, -1).await?,
        "s" => handle.move_player(0, 1).await?,
        "a" => handle.move_player(-1, 0).await?,
        "d" => handle.move_player(1, 0).await?,
        "e" => handle.enter_or_exit().await?,
        "c" => handle.defuse_selected_bomb().await?,
        "b" => handle.detonate_selected_bomb().await?,
        "" => return Ok(true),
        _ => return Ok(false),
    };
    Ok(true)
}

fn render(snapshot: &Snapshot) -> String {
    let size = GRID_SIZE as usize;
    let mut rows = vec![vec!['.'; size]; size];
    let mut put = |x: i32, y: i32, c: char| {
        if let (Ok(x), Ok(y)) = (usize::try_from(x), usize::try_from(y)) {
            if x < size && y < size {
                rows[y][x] = c;
            }
        }
    };

    for y in 0..GRID_SIZE {
        for x in 0..GRID_SIZE {
            if is_door(snapshot.scene, x, y) {
                put(x, y, 'D');
            } else if snapshot.scene == Scene::Campus && is_building_footprint(x, y) {
                put(x, y, '#');
            }
        }
    }
    for hazard in snapshot.hazards.iter().filter(|h| h.scene() == snapshot.scene) {
        put(hazard.pos().x, hazard.pos().y, 'O');
    }
    for bomb in snapshot.bombs.iter().filter(|b| b.scene() == snapshot.scene) {
        let c = match bomb.status() {
            BombStatus::Active => 'B',
            BombStatus::Exploded => 'X',
            BombStatus::Diffused => 'b',
        };
        put(bomb.pos().x, bomb.pos().y, c);
    }
    for patroller in snapshot.patrollers.iter().filter(|p| p.scene() == snapshot.scene) {
        put(patroller.pos().x, patroller.pos().y, 'T');
    }
    put(snapshot.player.x, snapshot.player.y, 'P');

    let mut out = format!(
        "[{}] score {} | {}\n",
        snapshot.scene.as_str(),
        snapshot.score,
        snapshot.message
    );
    for row in rows {
        out.extend(row);
        out.push('\n');
    }
    out
}

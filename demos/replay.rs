use astar_visualizer::{Position, Session, SessionConfig};
use std::time::{Duration, Instant};

// A search on a 7x7 grid with a wall across the middle, replayed headlessly.
// Every applied event prints the grid:
// . empty, # wall, E endpoint, o frontier, x visited
fn main() -> astar_visualizer::Result<()> {
    env_logger::init();
    let mut config = SessionConfig::default();
    config.playback.tick_interval = Duration::from_millis(20);

    let mut session = Session::blank(7, config);
    session.choose_endpoint(Position::new(0, 3))?;
    session.choose_endpoint(Position::new(6, 3))?;
    for y in 1..7 {
        session.modify_wall(Position::new(3, y), true)?;
    }
    session.start_search()?;

    let mut applied = 0;
    while session.search_in_progress() || session.is_locked() {
        if let Some(event) = session.tick(Instant::now())? {
            applied += 1;
            println!("{:?}\n{}", event, session.grid());
        }
        std::thread::sleep(Duration::from_millis(1));
    }
    println!("Replayed {applied} events");
    if let Some(outcome) = session.shutdown()? {
        match outcome.path() {
            Some(path) => println!("Path: {path:?}"),
            None => println!("No path: {outcome:?}"),
        }
    }
    Ok(())
}

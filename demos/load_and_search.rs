use astar_visualizer::{channel, map_io, Grid, SearchConfig, SearchTask};

// Loads a map from the path given as the first argument (or a built-in one), searches it
// with 8-connected movement and prints the replayed grid.
const DEFAULT_MAP: &str = "\
size 5
start 0 0
end 4 4
map
S....
.@@@.
.@...
.@.@.
...@G
";

fn main() -> astar_visualizer::Result<()> {
    env_logger::init();
    let map = match std::env::args().nth(1) {
        Some(path) => map_io::load_map(path)?,
        None => map_io::parse_map(DEFAULT_MAP)?,
    };
    println!("{map}");

    let (tx, rx) = channel::unbounded();
    let mut task = SearchTask::new(map.clone(), tx, SearchConfig::eight_connected())?;
    task.start()?;
    let outcome = task.join()?;

    let mut grid = Grid::build(&map)?;
    let events = rx.drain();
    for event in &events {
        grid.apply(event)?;
    }
    println!("{grid}");
    println!("{} events, {:?}", events.len(), outcome.cost_in_steps());
    Ok(())
}

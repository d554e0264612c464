//! End-to-end runs: a search on its own thread, events through the channel, replay onto a grid.
use std::time::{Duration, Instant};

use astar_visualizer::{
    channel, Action, CellTag, Error, Grid, OccupancyMap, PlaybackConfig, Position, SearchConfig,
    SearchOutcome, SearchTask, Session, SessionConfig, VisualizationEvent,
};

fn init() {
    env_logger::try_init().ok();
}

fn run_task(map: OccupancyMap, config: SearchConfig) -> (SearchOutcome, Vec<VisualizationEvent>) {
    let (tx, rx) = channel::unbounded();
    let mut task = SearchTask::new(map, tx, config).unwrap();
    task.start().unwrap();
    let outcome = task.join().unwrap();
    (outcome, rx.drain())
}

#[test]
fn three_by_three_open_grid() {
    init();
    let map = OccupancyMap::new(3, Position::new(0, 0), Position::new(2, 2));
    let (outcome, events) = run_task(map.clone(), SearchConfig::default());

    let origin = Position::new(0, 0);
    assert_eq!(
        events[..4],
        [
            VisualizationEvent::lock(),
            VisualizationEvent::push(origin, CellTag::Frontier),
            VisualizationEvent::pop(origin, CellTag::Frontier),
            VisualizationEvent::push(origin, CellTag::Visited),
        ]
    );
    let n = events.len();
    assert_eq!(events[n - 1], VisualizationEvent::unlock());
    assert_eq!(events[n - 2], VisualizationEvent::push(Position::new(2, 2), CellTag::Visited));
    assert_eq!(outcome.cost_in_steps(), Some(4.0));
    assert_eq!(outcome.path().unwrap().len(), 5);

    let mut grid = Grid::build(&map).unwrap();
    for event in &events {
        grid.apply(event).unwrap();
    }
    assert_eq!(grid.top(Position::new(2, 2)).unwrap(), CellTag::Visited);
    assert_eq!(grid.count_top(CellTag::Wall), 0);
}

#[test]
fn corner_to_corner_on_open_squares() {
    init();
    for size in [2usize, 5, 9, 16] {
        let end = Position::new(size as i32 - 1, size as i32 - 1);
        let map = OccupancyMap::new(size, Position::new(0, 0), end);
        let (outcome, events) = run_task(map, SearchConfig::four_connected());
        let path = outcome.path().unwrap();
        assert_eq!(path.len() - 1, 2 * (size - 1));
        let visited = events
            .iter()
            .filter(|e| e.action == Action::Push && e.tag == Some(CellTag::Visited))
            .count();
        assert!(visited <= size * size);
        assert_eq!(visited, outcome.expanded());
    }
}

#[test]
fn enclosed_end_is_never_visited() {
    init();
    let end = Position::new(3, 3);
    let mut map = OccupancyMap::new(5, Position::new(0, 0), end);
    for p in end.moore_neighborhood() {
        map.set_blocked(p, true).unwrap();
    }
    for config in [SearchConfig::four_connected(), SearchConfig::eight_connected()] {
        let (outcome, events) = run_task(map.clone(), config);
        assert!(matches!(outcome, SearchOutcome::Unreachable { .. }));
        assert_eq!(events.last(), Some(&VisualizationEvent::unlock()));
        assert!(!events.iter().any(|e| e.tag.is_some() && e.position() == end));
    }
}

#[test]
fn extracted_map_matches_before_search() {
    init();
    let mut map = OccupancyMap::new(6, Position::new(0, 1), Position::new(5, 4));
    for p in [(0, 0), (2, 2), (2, 3), (4, 5), (5, 0)] {
        map.set_blocked(p.into(), true).unwrap();
    }
    let grid = Grid::build(&map).unwrap();
    assert_eq!(grid.extract_occupancy(&map).unwrap(), map);
}

#[test]
fn session_replays_one_event_per_tick() {
    init();
    let interval = Duration::from_millis(100);
    let config = SessionConfig {
        playback: PlaybackConfig {
            tick_interval: interval,
            channel_capacity: Some(4),
        },
        ..SessionConfig::default()
    };
    let mut map = OccupancyMap::new(5, Position::new(0, 0), Position::new(4, 4));
    map.set_blocked(Position::new(2, 2), true).unwrap();
    let mut session = Session::new(map, config).unwrap();
    session.start_search().unwrap();

    let t0 = Instant::now();
    let mut applied = Vec::new();
    let mut tick = 0u32;
    while applied.last() != Some(&VisualizationEvent::unlock()) {
        let now = t0 + interval * tick;
        // A second tick at the same instant never applies anything
        let first = session.tick(now).unwrap();
        assert_eq!(session.tick(now).unwrap(), None);
        match first {
            Some(event) => applied.push(event),
            None => std::thread::sleep(Duration::from_millis(1)),
        }
        if applied.len() > 1 && applied.last() != Some(&VisualizationEvent::unlock()) {
            assert!(session.is_locked());
        }
        tick += 1;
    }
    assert_eq!(applied[0], VisualizationEvent::lock());
    assert!(!session.is_locked());
    assert_eq!(session.grid().top(Position::new(2, 2)).unwrap(), CellTag::Wall);

    let outcome = session.last_outcome().unwrap().clone();
    assert!(outcome.is_found());
    let visited = applied
        .iter()
        .filter(|e| e.action == Action::Push && e.tag == Some(CellTag::Visited))
        .count();
    assert_eq!(visited, outcome.expanded());
    assert_eq!(session.shutdown().unwrap(), Some(outcome));
}

#[test]
fn session_keeps_edits_made_after_search() {
    init();
    let map = OccupancyMap::new(4, Position::new(0, 0), Position::new(3, 3));
    let mut session = Session::new(map, SessionConfig::default()).unwrap();
    session.start_search().unwrap();
    session.join_search().unwrap();
    session.flush().unwrap();

    assert!(session.modify_wall(Position::new(1, 2), true).unwrap());
    let saved = session.save_map().unwrap().clone();
    assert!(saved.is_blocked(Position::new(1, 2)));
    assert_eq!(saved.blocked_count(), 1);

    session.remove_endpoint(Position::new(3, 3)).unwrap();
    assert!(matches!(session.start_search(), Err(Error::MissingEndpoints)));
    session.choose_endpoint(Position::new(2, 0)).unwrap();
    session.start_search().unwrap();
    let outcome = session.shutdown().unwrap().unwrap();
    assert_eq!(outcome.path().unwrap().last(), Some(&Position::new(2, 0)));
}

#[test]
fn cancelling_a_task_still_unlocks() {
    init();
    let (tx, rx) = channel::bounded(1);
    let map = OccupancyMap::new(64, Position::new(0, 0), Position::new(63, 63));
    let mut task = SearchTask::new(map, tx, SearchConfig::default()).unwrap();
    task.start().unwrap();
    // The bounded channel holds the search back until we read
    assert_eq!(rx.receive_timeout(Duration::from_secs(5)), Some(VisualizationEvent::lock()));
    task.cancel();
    let mut rest = Vec::new();
    while let Some(event) = rx.receive_timeout(Duration::from_secs(5)) {
        rest.push(event);
        if event == VisualizationEvent::unlock() {
            break;
        }
    }
    assert_eq!(rest.last(), Some(&VisualizationEvent::unlock()));
    assert!(matches!(task.join().unwrap(), SearchOutcome::Cancelled { .. }));
}

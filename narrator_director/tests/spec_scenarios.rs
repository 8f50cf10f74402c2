//! Literal seed scenarios: fixed storylet pools and configs with known,
//! hand-checked expected outcomes, used as a regression net alongside the
//! randomized property tests in `invariant_properties.rs`.

use narrator_director::{Director, DirectorConfig, StubJudge};
use narrator_storylets::{Precondition, Storylet, StoryletLibrary};

fn bare_storylet(id: &str, weight: f64) -> Storylet {
    Storylet {
        id: id.to_string(),
        title: id.to_string(),
        description: String::new(),
        tags: vec![],
        preconditions: Vec::<Precondition>::new(),
        effects: vec![],
        weight,
        once: false,
        cooldown: 0,
        intensity_delta: 0.0,
        is_fallback: false,
        requires_fired: vec![],
        forbids_fired: vec![],
    }
}

fn only_id(record: &narrator_director::TickRecord) -> Option<String> {
    record.selected.first().map(|s| s.storylet_id.clone())
}

/// A{weight=1,cooldown=2}, B{weight=0}. Ticks 0..3 must select [A, ∅, ∅, A]:
/// A fires at 0 and 3, nothing at 1 and 2 while A is cooling and B never has
/// enough weight to be drawn.
#[test]
fn scenario_cooldown() {
    let library = StoryletLibrary::new(vec![
        Storylet {
            cooldown: 2,
            ..bare_storylet("a", 1.0)
        },
        bare_storylet("b", 0.0),
    ]);
    let judge = StubJudge::new();
    let mut director = Director::new(&library, DirectorConfig::for_testing(), &judge);

    let selected: Vec<Option<String>> = (0..4).map(|_| only_id(director.tick().unwrap())).collect();

    assert_eq!(
        selected,
        vec![Some("a".to_string()), None, None, Some("a".to_string())]
    );
}

/// Intro{once=true,weight=1}, Ambient{is_fallback=true,weight=1}, with
/// `idle_tick_threshold=0`. Tick 0 selects Intro; with the regular pool
/// empty on tick 1 and the idle threshold already satisfied, tick 1 selects
/// Ambient.
#[test]
fn scenario_once_and_fallback() {
    let mut config = DirectorConfig::for_testing();
    config.fallback.idle_tick_threshold = 0;

    let library = StoryletLibrary::new(vec![
        Storylet {
            once: true,
            ..bare_storylet("intro", 1.0)
        },
        Storylet {
            is_fallback: true,
            ..bare_storylet("ambient", 1.0)
        },
    ]);
    let judge = StubJudge::new();
    let mut director = Director::new(&library, config, &judge);

    let selected: Vec<Option<String>> = (0..2).map(|_| only_id(director.tick().unwrap())).collect();

    assert_eq!(
        selected,
        vec![Some("intro".to_string()), Some("ambient".to_string())]
    );
}

/// Peace{once=true,weight=1}, War{weight=1,forbids_fired=[Peace]}. Once
/// Peace has fired, War must never be selected again.
#[test]
fn scenario_forbids() {
    let library = StoryletLibrary::new(vec![
        Storylet {
            once: true,
            ..bare_storylet("peace", 1.0)
        },
        Storylet {
            forbids_fired: vec!["peace".to_string()],
            ..bare_storylet("war", 1.0)
        },
    ]);
    let judge = StubJudge::new();
    let mut director = Director::new(&library, DirectorConfig::for_testing(), &judge);

    let first = only_id(director.tick().unwrap());
    assert_eq!(first.as_deref(), Some("peace"));

    for _ in 0..10 {
        let record = director.tick().unwrap();
        assert_ne!(only_id(record).as_deref(), Some("war"));
    }
}

/// Calm{intensity_delta=-0.2}, Spike{intensity_delta=+0.2}, both weight 1,
/// with `pacing_preference=calm` (target 0.3), `pacing_scale=1.0`, starting
/// intensity 0.8 — the literal worked example in the spec's pacing scenario.
/// Over 20 ticks the count of Calm selections must exceed Spike by at least 5.
#[test]
fn scenario_pacing_favors_the_target_intensity() {
    let mut config = DirectorConfig::for_testing();
    config.pacing.pacing_preference = narrator_director::config::PacingPreference::Calm;
    config.pacing.pacing_scale = 1.0;
    config.pacing.intensity_decay = 0.0;

    let library = StoryletLibrary::new(vec![
        Storylet {
            intensity_delta: -0.2,
            ..bare_storylet("calm", 1.0)
        },
        Storylet {
            intensity_delta: 0.2,
            ..bare_storylet("spike", 1.0)
        },
    ]);
    let judge = StubJudge::new();
    let mut state = narrator_core::StateStore::new();
    state.world.intensity = 0.8;
    let mut director = Director::with_initial_state(&library, config, &judge, state);

    let mut calm_count = 0;
    let mut spike_count = 0;
    for _ in 0..20 {
        match only_id(director.tick().unwrap()).as_deref() {
            Some("calm") => calm_count += 1,
            Some("spike") => spike_count += 1,
            _ => {}
        }
    }
    assert!(
        calm_count >= spike_count + 5,
        "expected calm ({calm_count}) to exceed spike ({spike_count}) by at least 5"
    );
}

//! Integration tests for the repair loop and the generation flows

use std::collections::VecDeque;

use pretty_assertions::assert_eq;
use spatial_engine::{
    repair, CollaboratorError, CorrectionRequest, Element, Engine, EngineError, GenerationRequest,
    Layout, LayoutCorrector, LayoutGenerator, ModelTier, Rect, RefinementRequest, RepairConfig,
    Scene, Session, Terminal,
};

/// In-memory model with canned responses per call type
#[derive(Default)]
struct ScriptedModel {
    generations: VecDeque<Result<String, CollaboratorError>>,
    refinements: VecDeque<Result<String, CollaboratorError>>,
    corrections: VecDeque<Result<String, CollaboratorError>>,
    /// Repeated once `corrections` runs dry
    fallback_correction: Option<String>,
    /// Answer every correction with the layout it was sent
    echo_corrections: bool,
    high_tier_available: bool,
    probes: usize,
    correction_calls: usize,
    seen_tiers: Vec<ModelTier>,
    seen_violation_counts: Vec<usize>,
}

impl ScriptedModel {
    fn new() -> Self {
        Self {
            high_tier_available: true,
            ..Self::default()
        }
    }

    fn with_generation(mut self, text: &str) -> Self {
        self.generations.push_back(Ok(text.to_string()));
        self
    }

    fn with_refinement(mut self, text: &str) -> Self {
        self.refinements.push_back(Ok(text.to_string()));
        self
    }

    fn with_correction(mut self, text: &str) -> Self {
        self.corrections.push_back(Ok(text.to_string()));
        self
    }

    fn with_correction_error(mut self, err: CollaboratorError) -> Self {
        self.corrections.push_back(Err(err));
        self
    }

    fn always_correcting_with(mut self, text: &str) -> Self {
        self.fallback_correction = Some(text.to_string());
        self
    }

    fn echoing_layout(mut self) -> Self {
        self.echo_corrections = true;
        self
    }

    fn without_high_tier(mut self) -> Self {
        self.high_tier_available = false;
        self
    }
}

impl LayoutCorrector for ScriptedModel {
    async fn correct(&mut self, request: CorrectionRequest<'_>) -> Result<String, CollaboratorError> {
        self.correction_calls += 1;
        self.seen_tiers.push(request.tier);
        self.seen_violation_counts.push(request.violations.len());
        if self.echo_corrections {
            return serde_json::to_string(request.layout)
                .map_err(|err| CollaboratorError::Malformed(err.to_string()));
        }
        match self.corrections.pop_front() {
            Some(response) => response,
            None => self
                .fallback_correction
                .clone()
                .ok_or_else(|| CollaboratorError::Failed("no scripted correction".to_string())),
        }
    }
}

impl LayoutGenerator for ScriptedModel {
    async fn generate(&mut self, request: GenerationRequest<'_>) -> Result<String, CollaboratorError> {
        self.seen_tiers.push(request.tier);
        self.generations
            .pop_front()
            .unwrap_or_else(|| Err(CollaboratorError::Failed("no scripted generation".to_string())))
    }

    async fn refine(&mut self, request: RefinementRequest<'_>) -> Result<String, CollaboratorError> {
        self.seen_tiers.push(request.tier);
        self.refinements
            .pop_front()
            .unwrap_or_else(|| Err(CollaboratorError::Failed("no scripted refinement".to_string())))
    }

    async fn probe(&mut self, tier: ModelTier) -> Result<(), CollaboratorError> {
        self.probes += 1;
        match (tier, self.high_tier_available) {
            (ModelTier::High, false) => Err(CollaboratorError::Unavailable("403".to_string())),
            _ => Ok(()),
        }
    }
}

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn overlapping_walls() -> Layout {
    Layout::from_elements(
        800.0,
        600.0,
        vec![
            Element::new("w1", "wall", Rect::new(0.0, 0.0, 10.0, 10.0)),
            Element::new("w2", "wall", Rect::new(5.0, 5.0, 10.0, 10.0)),
        ],
    )
}

const OVERLAPPING_RESPONSE: &str = r#"```json
{
  "reasoning_plan": "two walls",
  "elements": [
    {"id": "w1", "t": "wall", "x": 0, "y": 0, "w": 10, "h": 10},
    {"id": "w2", "t": "Barrier", "x": "5", "y": "5", "w": 10, "h": 10}
  ]
}
```"#;

#[tokio::test]
async fn test_convergence_stops_calling_corrector() {
    init_logging();
    let scene = Scene::parking();
    let mut model = ScriptedModel::new()
        .with_correction(r#"{"fix_strategy": ["move w2"], "elements": [{"id": "w2", "x": 40}]}"#)
        .always_correcting_with(r#"{"elements": [{"id": "w1", "x": 700}]}"#);

    let outcome = repair(
        overlapping_walls(),
        &scene,
        &mut model,
        &mut Session::seeded(1),
        &RepairConfig::default(),
    )
    .await;

    assert_eq!(outcome.terminal, Terminal::Converged);
    assert_eq!(outcome.score, 0);
    assert_eq!(model.correction_calls, 1);
    assert_eq!(model.seen_violation_counts, vec![1]);
}

#[tokio::test]
async fn test_stagnation_guard() {
    init_logging();
    let scene = Scene::parking();
    let mut model = ScriptedModel::new().echoing_layout();

    let config = RepairConfig::default();
    let outcome = repair(
        overlapping_walls(),
        &scene,
        &mut model,
        &mut Session::seeded(1),
        &config,
    )
    .await;

    assert_eq!(outcome.terminal, Terminal::Stagnant);
    assert_eq!(outcome.passes, 2);
    assert_eq!(model.correction_calls, 1);
    assert!(model.correction_calls <= config.max_passes);
    assert_eq!(outcome.layout, overlapping_walls());
}

#[tokio::test]
async fn test_empty_correction_stagnates() {
    init_logging();
    let scene = Scene::parking();
    let mut model = ScriptedModel::new().always_correcting_with(r#"{"elements": []}"#);

    let outcome = repair(
        overlapping_walls(),
        &scene,
        &mut model,
        &mut Session::seeded(1),
        &RepairConfig::default(),
    )
    .await;

    assert_eq!(outcome.terminal, Terminal::Stagnant);
    assert_eq!(outcome.passes, 2);
}

#[tokio::test]
async fn test_pass_limit() {
    init_logging();
    let scene = Scene::parking();
    // every correction fixes one overlap, so four passes leave one pair behind
    let layout = Layout::from_elements(
        800.0,
        600.0,
        (0..5)
            .flat_map(|i| {
                let x = i as f64 * 100.0;
                [
                    Element::new(format!("a{i}"), "wall", Rect::new(x, 0.0, 10.0, 10.0)),
                    Element::new(format!("b{i}"), "wall", Rect::new(x + 5.0, 0.0, 10.0, 10.0)),
                ]
            })
            .collect(),
    );
    let mut model = ScriptedModel::new();
    for i in 0..5 {
        let fix = format!(r#"{{"elements": [{{"id": "b{i}", "y": 50}}]}}"#);
        model = model.with_correction(&fix);
    }

    let outcome = repair(
        layout,
        &scene,
        &mut model,
        &mut Session::seeded(1),
        &RepairConfig::default(),
    )
    .await;

    assert_eq!(outcome.terminal, Terminal::MaxPassesReached);
    assert_eq!(outcome.passes, 4);
    assert_eq!(model.correction_calls, 4);
    assert_eq!(outcome.score, 5);
}

#[tokio::test]
async fn test_correction_failure_keeps_partial_progress() {
    init_logging();
    let scene = Scene::parking();
    let layout = Layout::from_elements(
        800.0,
        600.0,
        vec![
            Element::new("a", "wall", Rect::new(0.0, 0.0, 10.0, 10.0)),
            Element::new("b", "wall", Rect::new(5.0, 0.0, 10.0, 10.0)),
            Element::new("c", "wall", Rect::new(100.0, 0.0, 10.0, 10.0)),
            Element::new("d", "wall", Rect::new(105.0, 0.0, 10.0, 10.0)),
        ],
    );
    let mut model = ScriptedModel::new()
        .with_correction(r#"{"elements": [{"id": "b", "x": 50}]}"#)
        .with_correction_error(CollaboratorError::RateLimited("429".to_string()));

    let outcome = repair(
        layout,
        &scene,
        &mut model,
        &mut Session::seeded(1),
        &RepairConfig::default(),
    )
    .await;

    assert_eq!(
        outcome.terminal,
        Terminal::CorrectionFailed("rate limited: 429".to_string())
    );
    assert_eq!(outcome.passes, 2);
    assert_eq!(outcome.score, 5);
    assert_eq!(outcome.layout.get("b").map(|e| e.x), Some(50.0));
}

#[tokio::test]
async fn test_generate_decodes_normalizes_and_repairs() {
    init_logging();
    let engine = Engine::new(Scene::parking()).expect("Parking scene should build");
    let mut model = ScriptedModel::new()
        .with_generation(OVERLAPPING_RESPONSE)
        .with_correction(r#"{"elements": [{"id": "w2", "x": 20.4, "y": 4.6}]}"#);
    let mut session = Session::seeded(3);

    let outcome = engine
        .generate("two walls", &mut model, &mut session)
        .await
        .expect("Generation should succeed");

    assert!(outcome.is_converged());
    assert_eq!(session.tier(), Some(ModelTier::High));
    assert_eq!(model.seen_tiers, vec![ModelTier::High, ModelTier::High]);

    let w2 = outcome.layout.get("w2").cloned().expect("w2 should survive");
    assert_eq!(w2.kind, "wall");
    assert_eq!((w2.x, w2.y), (20.0, 5.0));
}

#[tokio::test]
async fn test_generate_falls_back_to_low_tier() {
    init_logging();
    let engine = Engine::new(Scene::parking()).expect("Parking scene should build");
    let mut model = ScriptedModel::new()
        .without_high_tier()
        .with_generation(r#"{"elements": []}"#)
        .with_generation(r#"{"elements": []}"#);
    let mut session = Session::seeded(3);

    engine.generate("empty", &mut model, &mut session).await.unwrap();
    engine.generate("empty", &mut model, &mut session).await.unwrap();

    assert_eq!(session.tier(), Some(ModelTier::Low));
    assert_eq!(model.probes, 1);
    assert_eq!(model.seen_tiers, vec![ModelTier::Low, ModelTier::Low]);
}

#[tokio::test]
async fn test_generate_rejects_non_object() {
    let engine = Engine::new(Scene::parking()).expect("Parking scene should build");
    let mut model = ScriptedModel::new().with_generation("[]");
    let result = engine
        .generate("anything", &mut model, &mut Session::seeded(1))
        .await;
    assert!(matches!(result, Err(EngineError::Decode(_))));
}

#[tokio::test]
async fn test_generate_surfaces_collaborator_error() {
    let engine = Engine::new(Scene::parking()).expect("Parking scene should build");
    let mut model = ScriptedModel::new();
    let result = engine
        .generate("anything", &mut model, &mut Session::seeded(1))
        .await;
    assert!(matches!(result, Err(EngineError::Collaborator(_))));
}

#[tokio::test]
async fn test_refine_adds_elements_and_runs_pipeline() {
    init_logging();
    let engine = Engine::new(Scene::parking()).expect("Parking scene should build");
    let current = Layout::from_elements(
        800.0,
        600.0,
        vec![Element::new("g1", "ground", Rect::new(100.0, 100.0, 400.0, 100.0))],
    );
    let mut model = ScriptedModel::new().with_refinement(
        r#"{"reasoning_plan": "add a lane above", "elements": [{"t": "road", "x": 100, "y": 40, "w": 400, "h": 60}]}"#,
    );
    let mut session = Session::seeded(5).with_tier(ModelTier::Low);

    let outcome = engine
        .refine(&current, &mut model, &mut session)
        .await
        .expect("Refinement should succeed");

    assert_eq!(model.probes, 0);
    assert!(outcome.is_converged());
    assert!(outcome.layout.contains_id("g1"));
    assert_eq!(outcome.layout.of_kind("driving_lane").count(), 1);
    assert!(outcome.layout.of_kind("parking_space").count() > 0);
    assert!(outcome.layout.of_kind("charging_station").count() > 0);
}

//! The orchestrator tying input, UI, state, animation and the scene together
//!
//! Collaborators talk to the game through their event buses. Listeners never
//! touch the game directly; they post a command into a mailbox that the game
//! drains after every operation and at the start of every [`Game::tick`], so
//! all handling stays on the one control flow in a well-defined order.

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::f32::consts::TAU;
use std::fmt;
use std::rc::Rc;
use std::time::Duration;

use cgmath::{Vector2, Vector3};
use winit::event::WindowEvent;

use crate::animation::AnimationSystem;
use crate::config::GameConfig;
use crate::core::clock::{system_clock, SharedClock};
use crate::core::events::{Event, EventBus, ListenerId};
use crate::core::timers::TimerQueue;
use crate::error::{GardenError, Result};
use crate::garden::Garden;
use crate::gfx::rendering::RenderTarget;
use crate::gfx::resources::AssetManager;
use crate::gfx::scene::{Scene, SceneEvent, SceneEventKind};
use crate::input::{InputEvent, InputEventKind, InputSystem};
use crate::items::{Item, ItemFactory, ItemId, ItemKind};
use crate::state::{
    AppState, GameStateManager, StateEvent, StateEventKind, StateKey, StatePatch, ToolRef,
};
use crate::ui::{Severity, UiAdapter, UiEvent, UiEventKind};

pub const MSG_SELECT_TOOL: &str = "Please select a tool first!";
pub const MSG_OUT_OF_BOUNDS: &str = "Please place items within the garden area!";
pub const MSG_PLACE_FAILED: &str = "Failed to place item";
pub const MSG_GARDEN_CLEARED: &str = "Garden cleared!";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameEventKind {
    Started,
    Paused,
    Resumed,
    ItemPlaced,
    ToolChanged,
    Disposed,
}

impl fmt::Display for GameEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            GameEventKind::Started => "game:started",
            GameEventKind::Paused => "game:paused",
            GameEventKind::Resumed => "game:resumed",
            GameEventKind::ItemPlaced => "item:placed",
            GameEventKind::ToolChanged => "tool:changed",
            GameEventKind::Disposed => "game:disposed",
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    Started,
    Paused,
    Resumed,
    ItemPlaced { id: ItemId, kind: ItemKind },
    ToolChanged(Option<ToolRef>),
    Disposed,
}

impl Event for GameEvent {
    type Kind = GameEventKind;

    fn kind(&self) -> GameEventKind {
        match self {
            GameEvent::Started => GameEventKind::Started,
            GameEvent::Paused => GameEventKind::Paused,
            GameEvent::Resumed => GameEventKind::Resumed,
            GameEvent::ItemPlaced { .. } => GameEventKind::ItemPlaced,
            GameEvent::ToolChanged(_) => GameEventKind::ToolChanged,
            GameEvent::Disposed => GameEventKind::Disposed,
        }
    }
}

enum Command {
    SelectTool(ToolRef),
    ToolCleared,
    ToggleDayNight,
    ClearGarden,
    SceneClick(Vector2<f32>),
    Resize(u32, u32),
    ItemAdded(ItemId),
    ItemRemoved(Item),
    ItemsCleared(Vec<Item>),
    ToolChanged(Option<ToolRef>),
    DayNightChanged(bool),
    SyncFromState,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TimerAction {
    HideLoading,
    HideTutorial,
}

type Mailbox = Rc<RefCell<VecDeque<Command>>>;

/// Listener that maps an event to an optional command and posts it
fn forward<E, F>(mailbox: &Mailbox, map: F) -> impl FnMut(&E) -> anyhow::Result<()> + 'static
where
    E: 'static,
    F: Fn(&E) -> Option<Command> + 'static,
{
    let mailbox = Rc::clone(mailbox);
    move |event: &E| {
        if let Some(command) = map(event) {
            mailbox.borrow_mut().push_back(command);
        }
        Ok(())
    }
}

/// The running garden designer
///
/// Generic over where frames go (`R`) and what shows the UI (`U`), both handed
/// in at construction.
pub struct Game<R: RenderTarget, U: UiAdapter> {
    config: GameConfig,
    scene: Scene<R>,
    ui: U,
    assets: AssetManager,
    state: GameStateManager,
    animation: AnimationSystem<ItemId>,
    input: InputSystem,
    garden: Garden,
    factory: ItemFactory,
    /// Final y rotation of every item placed with the grow-in animation
    spawn_targets: HashMap<ItemId, f32>,
    timers: TimerQueue<TimerAction>,
    mailbox: Mailbox,
    events: EventBus<GameEvent>,
    running: bool,
    disposed: bool,
}

impl<R: RenderTarget, U: UiAdapter> Game<R, U> {
    pub fn new(config: GameConfig, target: R, ui: U) -> Self {
        Self::with_clock(config, target, ui, system_clock())
    }

    /// Builds the game and starts it with the loading screen up
    ///
    /// # Arguments
    /// * `config` - Tunables for every component
    /// * `target` - Where frames are rendered
    /// * `ui` - User interface adapter
    /// * `clock` - Time source for tweens, timers and notifications
    pub fn with_clock(config: GameConfig, target: R, ui: U, clock: SharedClock) -> Self {
        let (width, height) = target.size();
        let mut game = Self {
            scene: Scene::new(&config.scene, &config.lighting, target),
            ui,
            assets: AssetManager::new(),
            state: GameStateManager::new(&config.state),
            animation: AnimationSystem::with_clock(Rc::clone(&clock)),
            input: InputSystem::new(width, height),
            garden: Garden::new(&config.garden),
            factory: ItemFactory::new(),
            spawn_targets: HashMap::new(),
            timers: TimerQueue::new(clock),
            mailbox: Rc::new(RefCell::new(VecDeque::new())),
            events: EventBus::new(),
            running: false,
            disposed: false,
            config,
        };
        game.initialize();
        game
    }

    /// Replaces the item factory with one whose seeds are reproducible
    pub fn with_item_seed(mut self, seed: u64) -> Self {
        self.factory = ItemFactory::with_seed(seed);
        self
    }

    fn initialize(&mut self) {
        self.wire_events();

        self.garden.attach(&mut self.scene, &mut self.assets);
        self.assets.preload(self.config.garden.texture_repeat);

        self.ui.show_loading();
        self.timers.schedule(
            Duration::from_millis(self.config.ui.loading_ms),
            TimerAction::HideLoading,
        );
        self.start();
        log::info!("Garden designer initialized");
    }

    fn wire_events(&mut self) {
        let mailbox = &self.mailbox;

        self.ui.on(
            UiEventKind::ToolSelected,
            forward(mailbox, |event: &UiEvent| match event {
                UiEvent::ToolSelected(tool) => Some(Command::SelectTool(tool.clone())),
                _ => None,
            }),
        );
        self.ui.on(UiEventKind::ToolCleared, forward(mailbox, |_: &UiEvent| Some(Command::ToolCleared)));
        self.ui.on(
            UiEventKind::DayNightToggle,
            forward(mailbox, |_: &UiEvent| Some(Command::ToggleDayNight)),
        );
        self.ui.on(UiEventKind::GardenClear, forward(mailbox, |_: &UiEvent| Some(Command::ClearGarden)));

        self.input.on(
            InputEventKind::Click,
            forward(mailbox, |event: &InputEvent| match event {
                InputEvent::Click { ndc } => Some(Command::SceneClick(*ndc)),
                _ => None,
            }),
        );
        self.input.on(
            InputEventKind::Resize,
            forward(mailbox, |event: &InputEvent| match event {
                InputEvent::Resize { width, height } => Some(Command::Resize(*width, *height)),
                _ => None,
            }),
        );

        self.state.on(
            StateEventKind::ItemAdded,
            forward(mailbox, |event: &StateEvent| match event {
                StateEvent::ItemAdded(item) => Some(Command::ItemAdded(item.id().clone())),
                _ => None,
            }),
        );
        self.state.on(
            StateEventKind::ItemRemoved,
            forward(mailbox, |event: &StateEvent| match event {
                StateEvent::ItemRemoved(item) => Some(Command::ItemRemoved(item.clone())),
                _ => None,
            }),
        );
        self.state.on(
            StateEventKind::ItemsCleared,
            forward(mailbox, |event: &StateEvent| match event {
                StateEvent::ItemsCleared(items) => Some(Command::ItemsCleared(items.clone())),
                _ => None,
            }),
        );
        self.state.on(
            StateEventKind::KeyChanged(StateKey::SelectedTool),
            forward(mailbox, |event: &StateEvent| match event {
                StateEvent::KeyChanged { current, .. } => {
                    Some(Command::ToolChanged(current.selected_tool.clone()))
                }
                _ => None,
            }),
        );
        for kind in [StateEventKind::Restored, StateEventKind::Imported] {
            self.state.on(kind, forward(mailbox, |_: &StateEvent| Some(Command::SyncFromState)));
        }

        self.scene.on(
            SceneEventKind::DayNightToggled,
            forward(mailbox, |event: &SceneEvent| match event {
                SceneEvent::DayNightToggled { is_night } => Some(Command::DayNightChanged(*is_night)),
                _ => None,
            }),
        );
    }

    pub fn on<F>(&mut self, kind: GameEventKind, handler: F) -> ListenerId
    where
        F: FnMut(&GameEvent) -> anyhow::Result<()> + 'static,
    {
        self.events.on(kind, handler)
    }

    pub fn off(&mut self, kind: GameEventKind, id: Option<ListenerId>) -> usize {
        self.events.off(kind, id)
    }

    /// Handles everything listeners have posted since the last call
    pub fn process_events(&mut self) {
        loop {
            let next = self.mailbox.borrow_mut().pop_front();
            let Some(command) = next else {
                break;
            };
            self.execute(command);
        }
    }

    fn execute(&mut self, command: Command) {
        match command {
            Command::SelectTool(tool) => self.state.set_selected_tool(Some(tool)),
            Command::ToolCleared => {
                if self.state.selected_tool().is_some() {
                    self.state.set_selected_tool(None);
                }
            }
            Command::ToggleDayNight => {
                self.apply_day_night_toggle();
            }
            Command::ClearGarden => {
                self.state.clear_all_items();
            }
            Command::SceneClick(ndc) => self.handle_scene_click(ndc),
            Command::Resize(width, height) => self.scene.resize(width, height),
            Command::ItemAdded(id) => self.light_new_item(&id),
            Command::ItemRemoved(mut item) => {
                self.animation.stop_all_for(item.id());
                item.dispose();
            }
            Command::ItemsCleared(items) => self.handle_items_cleared(items),
            Command::ToolChanged(tool) => {
                self.ui.set_active_tool(tool.as_ref());
                self.events.emit(&GameEvent::ToolChanged(tool));
            }
            Command::DayNightChanged(is_night) => self.ui.update_day_night_button(is_night),
            Command::SyncFromState => self.sync_from_state(),
        }
    }

    fn handle_scene_click(&mut self, ndc: Vector2<f32>) {
        self.input.set_pointer(ndc);
        let result = if self.state.selected_tool().is_none() {
            Err(GardenError::NoToolSelected)
        } else {
            match self
                .input
                .raycast_ground(self.scene.camera(), &self.garden.ground_plane())
            {
                Some(point) => self.try_place_at(point).map(|_| ()),
                // clicked the sky
                None => return,
            }
        };

        if let Err(err) = result {
            self.report_placement_error(&err);
        }
    }

    fn try_place_at(&mut self, position: Vector3<f32>) -> Result<ItemId> {
        let tool = self
            .state
            .selected_tool()
            .cloned()
            .ok_or(GardenError::NoToolSelected)?;
        if !self.garden.is_within_bounds(position) {
            return Err(GardenError::OutOfBounds {
                x: position.x,
                z: position.z,
            });
        }
        self.spawn(tool.kind()?, position)
    }

    fn spawn(&mut self, kind: ItemKind, position: Vector3<f32>) -> Result<ItemId> {
        let mut item = self.factory.create(&mut self.assets, kind, position);
        item.set_scale(self.config.items.spawn_start_scale);
        let id = item.id().clone();
        self.spawn_targets.insert(id.clone(), item.rotation().y + TAU);

        let duration = Duration::from_millis(self.config.items.spawn_duration_ms);
        self.animation.animate_scale(id.clone(), 1.0, duration);
        self.animation.animate_rotation(id.clone(), 1.0, duration);

        if !self.state.add_item(item) {
            self.animation.stop_all_for(&id);
            self.spawn_targets.remove(&id);
            return Err(GardenError::DuplicateItem(id.to_string()));
        }
        log::info!("Placed {} at ({:.2}, {:.2})", kind, position.x, position.z);
        self.events.emit(&GameEvent::ItemPlaced {
            id: id.clone(),
            kind,
        });
        Ok(id)
    }

    fn report_placement_error(&mut self, err: &GardenError) {
        match err {
            GardenError::NoToolSelected => {
                self.ui.show_notification(MSG_SELECT_TOOL, Severity::Warning);
            }
            GardenError::OutOfBounds { .. } => {
                log::warn!("Rejected placement: {}", err);
                self.ui.show_notification(MSG_OUT_OF_BOUNDS, Severity::Warning);
            }
            _ => {
                log::error!("Failed to place item: {}", err);
                self.ui.show_notification(MSG_PLACE_FAILED, Severity::Error);
            }
        }
    }

    fn light_new_item(&mut self, id: &ItemId) {
        let night = self.state.is_night_mode();
        if !night {
            return;
        }
        if let Some(item) = self.state.placed_items_mut().iter_mut().find(|item| item.id() == id) {
            item.toggle_night_mode(night);
        }
    }

    fn handle_items_cleared(&mut self, mut items: Vec<Item>) {
        for item in &mut items {
            self.animation.stop_all_for(item.id());
            item.dispose();
        }
        let evicted = self.assets.collect_garbage();
        log::info!("Garden cleared: {} items, {} cached assets evicted", items.len(), evicted);

        self.ui.clear_selected_tool();
        self.ui.show_notification(MSG_GARDEN_CLEARED, Severity::Success);
    }

    fn apply_day_night_toggle(&mut self) -> bool {
        let is_night = self.scene.toggle_day_night();
        self.state.set_state(StatePatch::new().night_mode(is_night));
        self.ui.update_day_night_button(is_night);
        for item in self.state.placed_items_mut() {
            item.toggle_night_mode(is_night);
        }
        is_night
    }

    fn sync_from_state(&mut self) {
        let night = self.state.is_night_mode();
        self.scene.set_night_mode(night);
        self.ui.update_day_night_button(night);
        self.ui.set_active_tool(self.state.selected_tool());
        if self.state.placed_items().iter().any(|item| item.is_night_mode() != night) {
            for item in self.state.placed_items_mut() {
                item.toggle_night_mode(night);
            }
        }
        self.settle_restored_items();
    }

    /// Snaps items caught mid grow-in by a snapshot to their final transform
    fn settle_restored_items(&mut self) {
        let unsettled = self
            .state
            .placed_items()
            .iter()
            .any(|item| self.needs_settling(item));
        if !unsettled {
            return;
        }

        let mut settled = 0;
        let animation = &self.animation;
        let targets = &self.spawn_targets;
        for item in self.state.placed_items_mut() {
            let Some(&rotation_y) = targets.get(item.id()) else {
                continue;
            };
            if animation.is_animating(item.id()) {
                continue;
            }
            item.set_scale(1.0);
            item.set_rotation_y(rotation_y);
            settled += 1;
        }
        log::debug!("Settled {} restored items", settled);
    }

    fn needs_settling(&self, item: &Item) -> bool {
        match self.spawn_targets.get(item.id()) {
            Some(&rotation_y) => {
                !self.animation.is_animating(item.id())
                    && (item.scale() != Vector3::new(1.0, 1.0, 1.0) || item.rotation().y != rotation_y)
            }
            None => false,
        }
    }

    fn run_timer(&mut self, action: TimerAction) {
        match action {
            TimerAction::HideLoading => {
                self.state.set_loading(false);
                self.ui.hide_loading();
                self.ui.show_tutorial();
                self.timers.schedule(
                    Duration::from_millis(self.config.ui.tutorial_ms),
                    TimerAction::HideTutorial,
                );
            }
            TimerAction::HideTutorial => {
                self.state.set_tutorial_visible(false);
                self.ui.hide_tutorial();
            }
        }
    }

    /// Pointer click at window pixel `(x, y)`
    pub fn click_at(&mut self, x: f64, y: f64) {
        self.input.cursor_moved(x, y);
        self.input.click();
        self.process_events();
    }

    pub fn handle_window_event(&mut self, event: &WindowEvent) {
        self.input.handle_window_event(event);
        self.process_events();
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.input.resize(width, height);
        self.process_events();
    }

    /// Places the selected tool's item at a ground position
    ///
    /// Failures are also shown to the user the same way a click would.
    ///
    /// # Returns
    /// The new item's id, [`GardenError::NoToolSelected`] without a tool or
    /// [`GardenError::OutOfBounds`] outside the garden
    pub fn place_at(&mut self, position: Vector3<f32>) -> Result<ItemId> {
        let result = self.try_place_at(position);
        if let Err(err) = &result {
            self.report_placement_error(err);
        }
        self.process_events();
        result
    }

    /// Places an item by category and subtype names, without a bounds check
    pub fn place_item(&mut self, category: &str, subtype: &str, position: Vector3<f32>) -> Result<ItemId> {
        let result = ItemKind::parse(category, subtype).and_then(|kind| self.spawn(kind, position));
        if let Err(err) = &result {
            self.report_placement_error(err);
        }
        self.process_events();
        result
    }

    pub fn select_tool(&mut self, tool: Option<ToolRef>) {
        self.state.set_selected_tool(tool);
        self.process_events();
    }

    pub fn remove_item(&mut self, id: &ItemId) -> bool {
        let removed = self.state.remove_item(id).is_some();
        self.process_events();
        removed
    }

    /// # Returns
    /// True if it is night afterwards
    pub fn toggle_day_night(&mut self) -> bool {
        let is_night = self.apply_day_night_toggle();
        self.process_events();
        is_night
    }

    pub fn clear_garden(&mut self) {
        self.state.clear_all_items();
        self.process_events();
    }

    pub fn undo(&mut self) -> bool {
        let undone = self.state.undo();
        self.process_events();
        undone
    }

    pub fn export_save(&self) -> Result<String> {
        self.state.export_json()
    }

    /// Replaces the garden with a saved one; on error nothing changes
    pub fn import_save(&mut self, json: &str) -> Result<()> {
        let factory = &self.factory;
        let assets = &mut self.assets;
        let result = self
            .state
            .import_json(json, |record| factory.rebuild(assets, record));
        if result.is_ok() {
            self.factory
                .skip_past(self.state.placed_items().iter().map(Item::id));
        }
        self.process_events();
        result
    }

    /// Advances one frame: timers, queued events, tweens, then rendering
    pub fn tick(&mut self) -> Result<()> {
        if self.disposed {
            return Ok(());
        }

        for action in self.timers.drain_due() {
            self.run_timer(action);
        }
        self.process_events();

        if !self.running {
            return Ok(());
        }
        if self.animation.active_count() > 0 {
            self.animation.update(self.state.placed_items_mut());
        }
        self.ui.update();
        self.render()
    }

    fn render(&mut self) -> Result<()> {
        let items = self
            .state
            .placed_items()
            .iter()
            .filter(|item| !item.is_disposed())
            .map(|item| (item.group(), item.world_matrix()));
        self.scene.render(items)
    }

    fn start(&mut self) {
        if self.running {
            return;
        }
        self.running = true;
        self.events.emit(&GameEvent::Started);
    }

    /// Stops animating and rendering; timers and input keep working
    pub fn pause(&mut self) {
        if self.running {
            self.running = false;
            self.events.emit(&GameEvent::Paused);
        }
    }

    pub fn resume(&mut self) {
        if !self.running && !self.disposed {
            self.running = true;
            self.events.emit(&GameEvent::Resumed);
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Tears everything down; later calls do nothing
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.pause();
        self.animation.clear();
        self.spawn_targets.clear();
        self.timers.clear();
        self.input.disable();
        self.ui.dispose();

        self.garden.detach(&mut self.scene);
        let released: usize = self
            .state
            .placed_items_mut()
            .iter_mut()
            .map(Item::dispose)
            .sum();
        self.scene.dispose();
        self.assets.dispose();
        self.mailbox.borrow_mut().clear();

        self.disposed = true;
        self.events.emit(&GameEvent::Disposed);
        self.events.clear();
        log::info!("Garden designer disposed ({} item parts released)", released);
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    pub fn get_state(&self) -> AppState {
        self.state.get_state()
    }

    pub fn state(&self) -> &GameStateManager {
        &self.state
    }

    pub fn placed_items(&self) -> &[Item] {
        self.state.placed_items()
    }

    pub fn scene(&self) -> &Scene<R> {
        &self.scene
    }

    pub fn garden(&self) -> &Garden {
        &self.garden
    }

    pub fn assets(&self) -> &AssetManager {
        &self.assets
    }

    pub fn active_tweens(&self) -> usize {
        self.animation.active_count()
    }

    pub fn ui(&self) -> &U {
        &self.ui
    }

    pub fn ui_mut(&mut self) -> &mut U {
        &mut self.ui
    }

    pub fn input(&self) -> &InputSystem {
        &self.input
    }

    /// Render target and UI at once, for drawing the UI over the frame
    pub fn target_and_ui_mut(&mut self) -> (&mut R, &mut U) {
        (self.scene.target_mut(), &mut self.ui)
    }
}

//! The snake game on a matrix, played with buttons or by a built-in solver.
//!
//! [`MatrixSnake`] is a [`MatrixNeoPatterns`] engine with one more pattern:
//! the game. It runs on the same scheduler, so between games it shows the
//! score and moves it out with ordinary matrix patterns.
//!
//! Poll [`MatrixSnake::handle_input`] on every loop pass so no button press is
//! missed; [`update`](PatternEngine::update) moves the snake once per interval.
//!
//! # Example
//!
//! ```rust
//! use embassy_time::{Duration, Instant};
//! use neo_patterns::color::{RGB8, colors};
//! use neo_patterns::matrix::MatrixGeometry;
//! use neo_patterns::matrix::layout::LedLayout;
//! use neo_patterns::patterns::{Direction, PatternEngine};
//! use neo_patterns::snake::{MatrixSnake, SnakeInput};
//!
//! const LAYOUT: LedLayout<64, 8, 8> = LedLayout::from_geometry(MatrixGeometry::BOTTOM_RIGHT_PROGRESSIVE);
//!
//! let mut leds = [RGB8::default(); 64];
//! let mut snake = MatrixSnake::new(LAYOUT);
//! snake.start(Duration::from_millis(200), colors::BLUE, SnakeInput::TwoButtons)?;
//! snake.update(&mut leds, Instant::from_millis(0), &mut ())?;
//! snake.set_direction(Direction::Up);
//! snake.update(&mut leds, Instant::from_millis(200), &mut ())?;
//! assert_eq!(snake.game().head().y, 3);
//! # Ok::<(), neo_patterns::Error>(())
//! ```

use embassy_time::{Duration, Instant};
use embedded_hal::digital::InputPin;
use fastrand::Rng;
use heapless::Vec;
use smart_leds::RGB8;

use crate::color::{BLACK, GREEN_HALF, colors, dim_color_with_gamma_32};
use crate::matrix::MatrixPixels;
use crate::matrix::layout::LedLayout;
use crate::matrix_patterns::{MatrixNeoPatterns, MatrixPattern, StartMatrixPattern};
use crate::patterns::{Direction, Pattern, PatternEngine, PatternKind, Phase, Scheduler, StartPattern, Step};
use crate::{Error, Result};

/// Time between two accepted presses in two-button mode.
pub const BUTTON_DEBOUNCE: Duration = Duration::from_millis(100);
/// How long the final position stays after a game.
pub const SHOW_END_DURATION: Duration = Duration::from_millis(3000);
/// How long the score stays after a game.
pub const SHOW_SCORE_DURATION: Duration = Duration::from_millis(2000);

/// Head first.
const INITIAL_BODY: [Position; 4] = [
    Position::new(4, 4),
    Position::new(5, 4),
    Position::new(6, 4),
    Position::new(6, 5),
];
const MIN_WIDTH: usize = 7;
const MIN_HEIGHT: usize = 6;
const APPLE_COLOR: RGB8 = colors::RED;
const HEAD_COLOR: RGB8 = colors::GREEN;

/// A cell of the matrix, `(0, 0)` at the top left.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Position {
    /// Column.
    pub x: u16,
    /// Row.
    pub y: u16,
}

impl Position {
    /// The cell at `(x, y)`.
    #[must_use]
    pub const fn new(x: u16, y: u16) -> Self {
        Self { x, y }
    }
}

/// State of one game: body, apple and heading. `N` bounds the snake's length.
#[derive(Debug, Clone)]
pub struct Snake<const N: usize> {
    body: Vec<Position, N>,
    apple: Position,
    direction: Direction,
    width: u16,
    height: u16,
    solved_apple: Option<Position>,
    clockwise: bool,
}

impl<const N: usize> Snake<N> {
    /// An empty game on a `width`×`height` area; call [`reset`](Self::reset)
    /// to place the snake and the apple.
    #[must_use]
    pub const fn new(width: u16, height: u16) -> Self {
        Self {
            body: Vec::new(),
            apple: Position::new(0, 0),
            direction: Direction::None,
            width,
            height,
            solved_apple: None,
            clockwise: false,
        }
    }

    /// Put the snake at its start position, standing still, and place a new apple.
    pub fn reset(&mut self, rng: &mut Rng) {
        self.body.clear();
        for position in INITIAL_BODY {
            if self.body.push(position).is_err() {
                break;
            }
        }
        self.direction = Direction::None;
        self.new_apple(rng);
    }

    /// The cells of the snake, head first.
    #[must_use]
    pub fn body(&self) -> &[Position] {
        &self.body
    }

    /// The head of the snake.
    #[must_use]
    pub fn head(&self) -> Position {
        self.body.first().copied().unwrap_or_default()
    }

    /// Number of cells of the snake.
    #[must_use]
    pub fn len(&self) -> usize {
        self.body.len()
    }

    /// `true` before [`reset`](Self::reset).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    /// The apple the snake chases.
    #[must_use]
    pub const fn apple(&self) -> Position {
        self.apple
    }

    /// Current heading; `None` while standing still or after a crash.
    #[must_use]
    pub const fn direction(&self) -> Direction {
        self.direction
    }

    /// Change the heading.
    pub const fn set_direction(&mut self, direction: Direction) {
        self.direction = direction;
    }

    /// Move the apple to a random free cell, never to its old place.
    ///
    /// The last column and row are never chosen.
    pub fn new_apple(&mut self, rng: &mut Rng) {
        let (width, height) = (self.width.saturating_sub(1).max(1), self.height.saturating_sub(1).max(1));
        let is_free = |snake: &Self, position: Position| position != snake.apple && !snake.body.contains(&position);
        for _ in 0..u32::from(width) * u32::from(height) * 4 {
            let candidate = Position::new(rng.u16(..width), rng.u16(..height));
            if is_free(self, candidate) {
                self.apple = candidate;
                return;
            }
        }
        if let Some(free) = (0..height)
            .flat_map(|y| (0..width).map(move |x| Position::new(x, y)))
            .find(|&position| is_free(self, position))
        {
            self.apple = free;
        }
    }

    /// The cell one step from the head in `direction`, `None` outside the area.
    #[must_use]
    pub fn next_head(&self, direction: Direction) -> Option<Position> {
        let head = self.head();
        let next = match direction {
            Direction::Up => Position::new(head.x, head.y.checked_sub(1)?),
            Direction::Down => Position::new(head.x, head.y + 1),
            Direction::Left => Position::new(head.x.checked_sub(1)?, head.y),
            Direction::Right => Position::new(head.x + 1, head.y),
            Direction::None => return None,
        };
        (next.x < self.width && next.y < self.height).then_some(next)
    }

    /// Index of `position` in the snake's body, without the head and the last
    /// cell, which moves away in the same step.
    #[must_use]
    pub fn tail_index_of(&self, position: Position) -> Option<usize> {
        let end = self.body.len().saturating_sub(1);
        (1..end).find(|&index| self.body[index] == position)
    }

    /// `true` if a step in `direction` neither leaves the area nor bites the tail.
    #[must_use]
    pub fn check_direction(&self, direction: Direction) -> bool {
        self.next_head(direction)
            .is_some_and(|next| self.tail_index_of(next).is_none())
    }

    /// Take one step in `direction`. Eating the apple makes the snake one
    /// cell longer and places a new apple.
    ///
    /// Returns the cell the snake left, or `None` (without moving) if the step
    /// is not allowed.
    pub fn advance(&mut self, direction: Direction, rng: &mut Rng) -> Option<Position> {
        let next = self.next_head(direction)?;
        if self.tail_index_of(next).is_some() {
            return None;
        }
        let left = *self.body.last()?;
        let ate = next == self.apple;
        if !ate || self.body.is_full() {
            self.body.pop();
        }
        self.body.insert(0, next).ok()?;
        if ate {
            self.new_apple(rng);
        }
        Some(left)
    }

    /// Greedy step towards the apple.
    ///
    /// The axis with the shorter distance goes first, reversing is never
    /// chosen. If that step is blocked, every other direction is tried, in
    /// `Up`, `Left`, `Down`, `Right` order or reversed in clockwise mode.
    /// Returns `None` if the snake is trapped.
    #[must_use]
    pub fn find_next_direction(&self) -> Direction {
        const ORDER: [Direction; 4] = [Direction::Up, Direction::Left, Direction::Down, Direction::Right];
        let head = self.head();
        let delta_x = i32::from(self.apple.x) - i32::from(head.x);
        let delta_y = i32::from(self.apple.y) - i32::from(head.y);
        let current = self.direction;
        let vertical = || {
            if delta_y > 0 && current != Direction::Up {
                Some(Direction::Down)
            } else if delta_y < 0 && current != Direction::Down {
                Some(Direction::Up)
            } else {
                None
            }
        };
        let horizontal = || {
            if delta_x > 0 && current != Direction::Left {
                Some(Direction::Right)
            } else if delta_x < 0 && current != Direction::Right {
                Some(Direction::Left)
            } else {
                None
            }
        };

        let shorter_y_first = if delta_x.abs() > delta_y.abs() && delta_y != 0 {
            vertical()
        } else {
            None
        };
        let wanted = shorter_y_first
            .or_else(horizontal)
            .or_else(vertical)
            .unwrap_or(current);
        if self.check_direction(wanted) {
            return wanted;
        }

        let opposite = current.opposite();
        let mut candidates = ORDER;
        if self.clockwise {
            candidates.reverse();
        }
        candidates
            .into_iter()
            .filter(|&direction| direction != wanted && direction != opposite)
            .find(|&direction| self.check_direction(direction))
            .unwrap_or(Direction::None)
    }

    /// Play the greedy solver on a copy until it eats the apple or gets
    /// stuck. The run is cut off after as many steps as the area has cells,
    /// times four.
    #[must_use]
    pub fn apple_reachable(&self) -> bool {
        let mut trial = self.clone();
        let mut rng = Rng::with_seed(0);
        let apple = self.apple;
        for _ in 0..u32::from(self.width) * u32::from(self.height) * 4 {
            let direction = trial.find_next_direction();
            if direction == Direction::None {
                return false;
            }
            trial.direction = direction;
            if trial.next_head(direction) == Some(apple) {
                return true;
            }
            if trial.advance(direction, &mut rng).is_none() {
                return false;
            }
        }
        false
    }

    /// The built-in solver: [`find_next_direction`](Self::find_next_direction),
    /// switched to clockwise search when a trial run for a new apple shows the
    /// apple cannot be reached the usual way.
    pub fn builtin_next_direction(&mut self) -> Direction {
        if self.solved_apple != Some(self.apple) {
            self.solved_apple = Some(self.apple);
            self.clockwise = false;
            if !self.apple_reachable() {
                self.clockwise = true;
            }
        }
        self.find_next_direction()
    }

    fn draw<const W: usize, const H: usize>(&self, pixels: &mut MatrixPixels<'_, W, H>, color: RGB8) {
        pixels.set_xy(i32::from(self.apple.x), i32::from(self.apple.y), APPLE_COLOR);
        let len = self.body.len();
        for (index, position) in self.body.iter().enumerate() {
            let brightness = ((len - index) * 255 / len) as u8;
            let color = if index == 0 {
                HEAD_COLOR
            } else {
                dim_color_with_gamma_32(color, brightness, true)
            };
            pixels.set_xy(i32::from(position.x), i32::from(position.y), color);
        }
    }
}

/// Buttons as read in one loop pass; `true` means pressed.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SnakeButtons {
    /// Turn right, or head right in four-button mode.
    pub right: bool,
    /// Turn left, or head left in four-button mode.
    pub left: bool,
    /// Head up.
    pub up: bool,
    /// Head down.
    pub down: bool,
}

impl SnakeButtons {
    /// Read buttons wired to ground, so a low pin means pressed. Up and down
    /// are optional.
    ///
    /// # Errors
    ///
    /// Returns the first pin error.
    pub fn read_pins<P: InputPin>(
        right: &mut P,
        left: &mut P,
        up: Option<&mut P>,
        down: Option<&mut P>,
    ) -> Result<Self, P::Error> {
        let mut pressed = |pin: Option<&mut P>| pin.map_or(Ok(false), InputPin::is_low);
        Ok(Self {
            right: pressed(Some(right))?,
            left: pressed(Some(left))?,
            up: pressed(up)?,
            down: pressed(down)?,
        })
    }

    const fn any_turn(self) -> bool {
        self.right || self.left
    }
}

/// How the snake is steered.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SnakeInput {
    /// Left and right turn the snake. The first press of up or down
    /// switches to four-button mode.
    #[default]
    TwoButtons,
    /// Each button sets its direction.
    FourButtons,
    /// The solver plays.
    Autorun,
}

/// What happens when a game is over.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SnakeEnd {
    /// Show the end position and the score, then start a new game.
    #[default]
    Restart,
    /// Complete the pattern and let the completion handler decide.
    Complete,
}

/// A solver replacing the built-in one: the next direction for a game.
/// [`Direction::None`] gives up and ends the game.
pub type SnakeSolver<const N: usize> = fn(&Snake<N>) -> Direction;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Showing {
    End { new_record: bool },
    Score,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AutorunStage {
    ShowEnd,
    ShowScore,
    MoveScore,
    StartNew,
}

#[derive(Debug, Clone, Copy)]
struct Autorun {
    stage: AutorunStage,
    /// Games left including the running one; 0 plays forever.
    games_left: u16,
    interval: Duration,
}

enum Frame {
    Unchanged,
    Moved(Position),
    Score { color: RGB8 },
    NewGame,
    GameOver,
}

/// Snake game engine on a `W`×`H` matrix of `N` LEDs, able to run every
/// matrix pattern as well.
pub struct MatrixSnake<const W: usize, const H: usize, const N: usize> {
    patterns: MatrixNeoPatterns<W, H, N>,
    game: Snake<N>,
    playing: bool,
    color: RGB8,
    input: SnakeInput,
    four_buttons: bool,
    end: SnakeEnd,
    showing: Option<(Showing, u32)>,
    moves: u32,
    high_score: usize,
    solver: Option<SnakeSolver<N>>,
    last_button: Option<Direction>,
    last_button_change: Option<Instant>,
    autorun: Option<Autorun>,
}

impl<const W: usize, const H: usize, const N: usize> MatrixSnake<W, H, N> {
    /// An idle engine for a matrix wired as `layout`.
    #[must_use]
    pub fn new(layout: LedLayout<N, W, H>) -> Self {
        Self::with_seed(layout, crate::patterns::DEFAULT_SEED)
    }

    /// Like [`new`](Self::new) with a chosen seed for apples and patterns.
    #[must_use]
    pub fn with_seed(layout: LedLayout<N, W, H>, seed: u64) -> Self {
        Self {
            patterns: MatrixNeoPatterns::with_seed(layout, seed),
            game: Snake::new(W as u16, H as u16),
            playing: false,
            color: colors::BLUE,
            input: SnakeInput::default(),
            four_buttons: false,
            end: SnakeEnd::default(),
            showing: None,
            moves: 0,
            high_score: 0,
            solver: None,
            last_button: None,
            last_button_change: None,
            autorun: None,
        }
    }

    /// The matrix engine for patterns between games.
    #[must_use]
    pub const fn patterns(&self) -> &MatrixNeoPatterns<W, H, N> {
        &self.patterns
    }

    /// The current game.
    #[must_use]
    pub const fn game(&self) -> &Snake<N> {
        &self.game
    }

    /// Moves in the current game.
    #[must_use]
    pub const fn moves(&self) -> u32 {
        self.moves
    }

    /// Longest snake since the engine was created.
    #[must_use]
    pub const fn high_score(&self) -> usize {
        self.high_score
    }

    /// What happens after a game played with buttons.
    pub const fn set_end(&mut self, end: SnakeEnd) {
        self.end = end;
    }

    /// Play autorun games with `solver` instead of the built-in one.
    pub const fn set_solver(&mut self, solver: Option<SnakeSolver<N>>) {
        self.solver = solver;
    }

    /// Scale all colors drawn from now on.
    pub const fn set_brightness(&mut self, brightness: u8, keep_nonzero: bool) {
        self.patterns.set_brightness(brightness, keep_nonzero);
    }

    /// Start a game. The snake stands still until the first button press.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MatrixTooSmall`] if the matrix is smaller than 7×6.
    pub fn start(&mut self, interval: Duration, color: RGB8, input: SnakeInput) -> Result<()> {
        self.start_game(interval, color, input)?;
        self.autorun = None;
        Ok(())
    }

    /// Let the solver play `repetitions` games (0 plays forever), each
    /// followed by the end position, the score and the score moving out. After
    /// the last game the completion handler takes over.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MatrixTooSmall`] if the matrix is smaller than 7×6.
    pub fn start_autorun(&mut self, interval: Duration, color: RGB8, repetitions: u16) -> Result<()> {
        self.start_game(interval, color, SnakeInput::Autorun)?;
        self.autorun = Some(Autorun {
            stage: AutorunStage::ShowEnd,
            games_left: repetitions,
            interval,
        });
        Ok(())
    }

    fn start_game(&mut self, interval: Duration, color: RGB8, input: SnakeInput) -> Result<()> {
        if W < MIN_WIDTH || H < MIN_HEIGHT || N < INITIAL_BODY.len() {
            return Err(Error::MatrixTooSmall {
                kind: PatternKind::Snake,
                width: MIN_WIDTH,
                height: MIN_HEIGHT,
            });
        }
        self.color = color;
        self.input = input;
        self.four_buttons = input == SnakeInput::FourButtons;
        self.new_game();
        if input == SnakeInput::Autorun {
            self.game.direction = Direction::Left;
        }
        self.playing = true;
        self.patterns.scheduler_mut().activate(PatternKind::Snake, interval);
        #[cfg(feature = "defmt")]
        defmt::info!("Start {} in {} mode", PatternKind::Snake, input);
        Ok(())
    }

    fn new_game(&mut self) {
        self.game.reset(StartPattern::rng(&mut self.patterns));
        self.moves = 0;
        self.showing = None;
        self.last_button = None;
    }

    /// Steer the snake directly, e.g. from a joystick or a serial line.
    pub const fn set_direction(&mut self, direction: Direction) {
        self.game.direction = direction;
    }

    /// Apply button presses; call this on every loop pass.
    ///
    /// In four-button mode each button sets its direction. In two-button mode
    /// a press turns the snake (the first press of a game sets the direction)
    /// and further presses count only after all buttons were released and
    /// [`BUTTON_DEBOUNCE`] has passed.
    pub fn handle_input(&mut self, buttons: SnakeButtons, now: Instant) {
        if !self.playing || self.input == SnakeInput::Autorun {
            return;
        }
        if buttons.up {
            self.game.direction = Direction::Up;
            self.four_buttons = true;
        } else if buttons.down {
            self.game.direction = Direction::Down;
            self.four_buttons = true;
        }

        if self.four_buttons {
            if buttons.right {
                self.game.direction = Direction::Right;
            } else if buttons.left {
                self.game.direction = Direction::Left;
            }
            return;
        }

        let debounced = self
            .last_button_change
            .is_none_or(|last| now.saturating_duration_since(last) > BUTTON_DEBOUNCE);
        if !debounced {
            return;
        }
        match self.last_button {
            None if buttons.any_turn() => {
                let current = self.game.direction;
                let (turn, turned) = if buttons.right {
                    (Direction::Right, current.turn_right())
                } else {
                    (Direction::Left, current.turn_left())
                };
                self.game.direction = if self.moves == 0 { turn } else { turned };
                self.last_button = Some(turn);
                self.last_button_change = Some(now);
            }
            Some(_) if !buttons.any_turn() => {
                self.last_button = None;
                self.last_button_change = Some(now);
            }
            _ => {}
        }
    }

    fn ticks(&self, duration: Duration) -> u32 {
        let interval = self.patterns.scheduler().interval().as_ticks().max(1);
        (duration.as_ticks() / interval).max(1) as u32
    }

    fn is_over(&self) -> bool {
        self.moves != 0 && self.game.direction == Direction::None
    }

    fn advance_game(&mut self) -> Frame {
        if self.input == SnakeInput::Autorun {
            self.game.direction = match self.solver {
                Some(solver) => solver(&self.game),
                None => self.game.builtin_next_direction(),
            };
            // A solver without a move ends the game, also before the first move.
            if self.game.direction == Direction::None {
                return Frame::GameOver;
            }
        } else if let Some((showing, ticks)) = self.showing {
            let ticks = ticks.saturating_sub(1);
            if ticks > 0 {
                self.showing = Some((showing, ticks));
                return Frame::Unchanged;
            }
            return match showing {
                Showing::End { new_record } => {
                    self.showing = Some((Showing::Score, self.ticks(SHOW_SCORE_DURATION)));
                    Frame::Score {
                        color: if new_record { colors::RED } else { GREEN_HALF },
                    }
                }
                Showing::Score => {
                    self.new_game();
                    Frame::NewGame
                }
            };
        }

        let mut left = None;
        if self.game.direction != Direction::None {
            let direction = self.game.direction;
            match self.game.advance(direction, StartPattern::rng(&mut self.patterns)) {
                Some(position) => {
                    left = Some(position);
                    self.moves += 1;
                }
                None => self.game.direction = Direction::None,
            }
        }
        if self.is_over() {
            return Frame::GameOver;
        }
        left.map_or(Frame::Unchanged, Frame::Moved)
    }

    fn game_over(&mut self) -> Step {
        #[cfg(feature = "defmt")]
        defmt::info!("Snake game over with length {} after {} moves", self.game.len(), self.moves);
        if self.input == SnakeInput::Autorun || self.end == SnakeEnd::Complete {
            self.playing = false;
            return Step::Completed { drawn: false };
        }
        let new_record = self.game.len() > self.high_score;
        if new_record {
            self.high_score = self.game.len();
        }
        self.showing = Some((Showing::End { new_record }, self.ticks(SHOW_END_DURATION)));
        Step::Unchanged
    }

    fn step_game(&mut self, leds: &mut [RGB8], phase: Phase) -> Result<Step> {
        let frame = match phase {
            Phase::Start => Frame::NewGame,
            Phase::Redraw if self.showing.is_some() || self.is_over() => Frame::Unchanged,
            Phase::Redraw => Frame::Moved(self.game.head()),
            Phase::Advance => self.advance_game(),
        };
        let mut pixels = self.patterns.pixels(leds)?;
        Ok(match frame {
            Frame::Unchanged => Step::Unchanged,
            Frame::Moved(left) => {
                pixels.set_xy(i32::from(left.x), i32::from(left.y), BLACK);
                self.game.draw(&mut pixels, self.color);
                Step::Drawn
            }
            Frame::Score { color } => {
                pixels.show_number(self.game.len() as u32, color);
                Step::Drawn
            }
            Frame::NewGame => {
                pixels.clear();
                self.game.draw(&mut pixels, self.color);
                Step::Drawn
            }
            Frame::GameOver => {
                drop(pixels);
                self.game_over()
            }
        })
    }

    fn stop_playing(&mut self) {
        self.playing = false;
        self.autorun = None;
    }
}

impl<const W: usize, const H: usize, const N: usize> PatternEngine for MatrixSnake<W, H, N> {
    fn scheduler(&self) -> &Scheduler {
        self.patterns.scheduler()
    }

    fn scheduler_mut(&mut self) -> &mut Scheduler {
        self.patterns.scheduler_mut()
    }

    fn step(&mut self, leds: &mut [RGB8], phase: Phase) -> Result<Step> {
        if self.playing {
            self.step_game(leds, phase)
        } else {
            self.patterns.step(leds, phase)
        }
    }

    /// Runs the autorun sequence after each game: end position, score, score
    /// moving out, then the next game or a pause before the handler takes over.
    fn complete_internally(&mut self, leds: &mut [RGB8], _finished: PatternKind) -> Result<bool> {
        let Some(mut autorun) = self.autorun else {
            return Ok(false);
        };
        match autorun.stage {
            AutorunStage::ShowEnd => {
                self.patterns.start(Pattern::Delay {
                    duration: SHOW_END_DURATION,
                })?;
                autorun.stage = AutorunStage::ShowScore;
            }
            AutorunStage::ShowScore => {
                self.patterns.show_number(leds, self.game.len() as u32, GREEN_HALF)?;
                self.patterns.start(Pattern::Delay {
                    duration: SHOW_SCORE_DURATION,
                })?;
                autorun.stage = AutorunStage::MoveScore;
            }
            AutorunStage::MoveScore => {
                self.patterns.start(MatrixPattern::Move {
                    direction: Direction::Left,
                    steps: W as u16,
                    interval: Duration::from_millis(30),
                    background: BLACK,
                })?;
                autorun.stage = AutorunStage::StartNew;
            }
            AutorunStage::StartNew => {
                if autorun.games_left == 1 {
                    self.patterns.start(Pattern::Delay {
                        duration: Duration::from_millis(u64::from(self.moves) * 2),
                    })?;
                    self.autorun = None;
                    return Ok(true);
                }
                autorun.games_left = autorun.games_left.saturating_sub(1);
                self.start_game(autorun.interval, self.color, SnakeInput::Autorun)?;
                autorun.stage = AutorunStage::ShowEnd;
            }
        }
        self.autorun = Some(autorun);
        Ok(true)
    }

    fn on_stop(&mut self) {
        self.stop_playing();
    }
}

impl<const W: usize, const H: usize, const N: usize> StartPattern for MatrixSnake<W, H, N> {
    fn start(&mut self, pattern: Pattern) -> Result<()> {
        self.patterns.start(pattern)?;
        self.stop_playing();
        Ok(())
    }

    fn led_count(&self) -> usize {
        N
    }

    fn rng(&mut self) -> &mut Rng {
        StartPattern::rng(&mut self.patterns)
    }
}

impl<const W: usize, const H: usize, const N: usize> StartMatrixPattern for MatrixSnake<W, H, N> {
    fn start_matrix(&mut self, pattern: MatrixPattern) -> Result<()> {
        self.patterns.start(pattern)?;
        self.stop_playing();
        Ok(())
    }

    fn matrix_size(&self) -> (usize, usize) {
        (W, H)
    }

    fn processed_color(&self) -> RGB8 {
        self.patterns.processed_color()
    }

    fn clear_matrix(&self, leds: &mut [RGB8]) -> Result<()> {
        self.patterns.clear_matrix(leds)
    }

    fn show_number(&self, leds: &mut [RGB8], number: u32, color: RGB8) -> Result<()> {
        self.patterns.show_number(leds, number, color)
    }

    fn start_snake_autorun(&mut self, interval: Duration, color: RGB8, repetitions: u16) -> Result<bool> {
        self.start_autorun(interval, color, repetitions)?;
        Ok(true)
    }
}

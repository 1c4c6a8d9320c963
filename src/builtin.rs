use crate::command::{CommandFactory, Context, ExecutableCommand, Mode, Outcome};
use crate::error::CommandError;
use crate::geometry::{self, Step};
use crate::interpreter::Factory;
use crate::lexer::Tokens;
use crate::state::Rgb;

/// Distance `reverse` travels when no argument is given.
pub const DEFAULT_REVERSE_DISTANCE: i64 = 100;
/// Angle `left` and `right` turn when no argument is given.
pub const DEFAULT_TURN_ANGLE: i64 = 90;
/// Upper bound on `square_spiral` turns; larger spirals cannot fit any canvas anyway.
pub const MAX_SPIRAL_TURNS: i64 = 10_000;

/// Commands known to the interpreter at compile time.
///
/// Each command validates its own arguments in [`BuiltinCommand::parse`] and is then
/// executed against the session [`Context`].
pub(crate) trait BuiltinCommand: Sized {
    /// Every name the command answers to, lower-case.
    fn names() -> &'static [&'static str];

    /// Validate the arguments. Nothing is changed yet.
    fn parse(tokens: &Tokens) -> Result<Self, CommandError>;

    fn execute(self, ctx: &mut Context<'_>) -> Result<Outcome, CommandError>;
}

impl<T: BuiltinCommand> ExecutableCommand for T {
    fn execute(self: Box<Self>, ctx: &mut Context<'_>) -> Result<Outcome, CommandError> {
        T::execute(*self, ctx)
    }
}

/// A recognized command whose arguments did not validate.
struct InvalidArgs {
    error: CommandError,
}

impl ExecutableCommand for InvalidArgs {
    fn execute(self: Box<Self>, _ctx: &mut Context<'_>) -> Result<Outcome, CommandError> {
        Err(self.error)
    }
}

impl<T: BuiltinCommand + 'static> CommandFactory for Factory<T> {
    fn try_create(&self, tokens: &Tokens) -> Option<Box<dyn ExecutableCommand>> {
        if T::names().contains(&tokens.command.as_str()) {
            Some(match T::parse(tokens) {
                Ok(cmd) => Box::new(cmd),
                Err(error) => Box::new(InvalidArgs { error }),
            })
        } else {
            None
        }
    }
}

fn non_negative(tokens: &Tokens, value: i64) -> Result<i64, CommandError> {
    if value < 0 {
        Err(tokens.out_of_range(value, "a value >= 0"))
    } else {
        Ok(value)
    }
}

/// Lower the pen. Also drops any loaded background image.
pub struct PenDown;

impl BuiltinCommand for PenDown {
    fn names() -> &'static [&'static str] {
        &["pendown"]
    }

    fn parse(_tokens: &Tokens) -> Result<Self, CommandError> {
        Ok(PenDown)
    }

    fn execute(self, ctx: &mut Context<'_>) -> Result<Outcome, CommandError> {
        ctx.state.pen_down = true;
        ctx.state.dirty = true;
        ctx.set_background(None);
        Ok(Outcome::Applied)
    }
}

pub struct PenUp;

impl BuiltinCommand for PenUp {
    fn names() -> &'static [&'static str] {
        &["penup"]
    }

    fn parse(_tokens: &Tokens) -> Result<Self, CommandError> {
        Ok(PenUp)
    }

    fn execute(self, ctx: &mut Context<'_>) -> Result<Outcome, CommandError> {
        ctx.state.pen_down = false;
        Ok(Outcome::Applied)
    }
}

/// Move forward along the current heading.
pub struct Move {
    name: String,
    pub distance: i64,
}

impl BuiltinCommand for Move {
    fn names() -> &'static [&'static str] {
        &["move", "forward"]
    }

    fn parse(tokens: &Tokens) -> Result<Self, CommandError> {
        let distance = non_negative(tokens, tokens.int_arg(0, "distance")?)?;
        Ok(Move {
            name: tokens.command.clone(),
            distance,
        })
    }

    fn execute(self, ctx: &mut Context<'_>) -> Result<Outcome, CommandError> {
        ctx.run(&self.name, &[Step::Forward(self.distance as f64)])
    }
}

/// Back up without changing the heading: turn around, move, turn around again.
pub struct Reverse {
    pub distance: i64,
}

impl BuiltinCommand for Reverse {
    fn names() -> &'static [&'static str] {
        &["reverse"]
    }

    fn parse(tokens: &Tokens) -> Result<Self, CommandError> {
        let distance = tokens
            .optional_int_arg(0)?
            .unwrap_or(DEFAULT_REVERSE_DISTANCE);
        Ok(Reverse {
            distance: non_negative(tokens, distance)?,
        })
    }

    fn execute(self, ctx: &mut Context<'_>) -> Result<Outcome, CommandError> {
        let steps = [
            Step::left(180),
            Step::Forward(self.distance as f64),
            Step::left(180),
        ];
        ctx.run("reverse", &steps)
    }
}

pub struct Turn {
    pub degrees: i32,
    pub clockwise: bool,
}

impl BuiltinCommand for Turn {
    fn names() -> &'static [&'static str] {
        &["left", "right"]
    }

    fn parse(tokens: &Tokens) -> Result<Self, CommandError> {
        let degrees = tokens.optional_int_arg(0)?.unwrap_or(DEFAULT_TURN_ANGLE);
        Ok(Turn {
            // Whole turns don't matter, and this keeps the value in i32 range.
            degrees: degrees.rem_euclid(360) as i32,
            clockwise: tokens.command == "right",
        })
    }

    fn execute(self, ctx: &mut Context<'_>) -> Result<Outcome, CommandError> {
        let step = Step::Turn {
            degrees: self.degrees,
            clockwise: self.clockwise,
        };
        let name = if self.clockwise { "right" } else { "left" };
        ctx.run(name, &[step])
    }
}

/// `red`, `green`, `blue` and `yellow`.
pub struct PresetColor {
    pub color: Rgb,
}

impl BuiltinCommand for PresetColor {
    fn names() -> &'static [&'static str] {
        &["red", "green", "blue", "yellow"]
    }

    fn parse(tokens: &Tokens) -> Result<Self, CommandError> {
        let color = match tokens.command.as_str() {
            "red" => Rgb::RED,
            "green" => Rgb::GREEN,
            "blue" => Rgb::BLUE,
            _ => Rgb::YELLOW,
        };
        Ok(PresetColor { color })
    }

    fn execute(self, ctx: &mut Context<'_>) -> Result<Outcome, CommandError> {
        ctx.set_color(self.color);
        Ok(Outcome::Applied)
    }
}

/// `pencolour r g b`, the components separated by spaces or commas.
pub struct PenColour {
    pub color: Rgb,
}

impl BuiltinCommand for PenColour {
    fn names() -> &'static [&'static str] {
        &["pencolour"]
    }

    fn parse(tokens: &Tokens) -> Result<Self, CommandError> {
        let values = tokens.int_list()?;
        let &[r, g, b] = values.as_slice() else {
            return Err(CommandError::MissingArgument {
                command: tokens.command.clone(),
                expected: "3 RGB values",
            });
        };
        let component = |value: i64| {
            u8::try_from(value).map_err(|_| tokens.out_of_range(value, "a value in 0..=255"))
        };
        Ok(PenColour {
            color: Rgb::new(component(r)?, component(g)?, component(b)?),
        })
    }

    fn execute(self, ctx: &mut Context<'_>) -> Result<Outcome, CommandError> {
        ctx.set_color(self.color);
        Ok(Outcome::Applied)
    }
}

pub struct PenWidth {
    pub width: u32,
}

impl BuiltinCommand for PenWidth {
    fn names() -> &'static [&'static str] {
        &["penwidth"]
    }

    fn parse(tokens: &Tokens) -> Result<Self, CommandError> {
        let value = tokens.int_arg(0, "width")?;
        match u32::try_from(value) {
            Ok(width) if width > 0 => Ok(PenWidth { width }),
            _ => Err(tokens.out_of_range(value, "a positive width")),
        }
    }

    fn execute(self, ctx: &mut Context<'_>) -> Result<Outcome, CommandError> {
        ctx.set_width(self.width);
        Ok(Outcome::Applied)
    }
}

/// Erase the drawing, asking first if it has unsaved changes.
pub struct Clear;

impl BuiltinCommand for Clear {
    fn names() -> &'static [&'static str] {
        &["clear"]
    }

    fn parse(_tokens: &Tokens) -> Result<Self, CommandError> {
        Ok(Clear)
    }

    fn execute(self, ctx: &mut Context<'_>) -> Result<Outcome, CommandError> {
        if ctx.state.dirty
            && ctx.mode == Mode::Interactive
            && !ctx
                .dialogs
                .confirm("You have unsaved changes. Are you sure you want to clear?")
        {
            ctx.say("Clear canceled. Please save your work.");
            return Ok(Outcome::Cancelled);
        }
        ctx.canvas.clear_surface();
        ctx.set_background(None);
        ctx.state.dirty = false;
        Ok(Outcome::Applied)
    }
}

pub struct Reset;

impl BuiltinCommand for Reset {
    fn names() -> &'static [&'static str] {
        &["reset"]
    }

    fn parse(_tokens: &Tokens) -> Result<Self, CommandError> {
        Ok(Reset)
    }

    fn execute(self, ctx: &mut Context<'_>) -> Result<Outcome, CommandError> {
        ctx.canvas.clear_surface();
        ctx.restore_defaults();
        Ok(Outcome::Applied)
    }
}

pub struct Square {
    pub length: i64,
}

impl BuiltinCommand for Square {
    fn names() -> &'static [&'static str] {
        &["square"]
    }

    fn parse(tokens: &Tokens) -> Result<Self, CommandError> {
        let length = non_negative(tokens, tokens.int_arg(0, "side length")?)?;
        Ok(Square { length })
    }

    fn execute(self, ctx: &mut Context<'_>) -> Result<Outcome, CommandError> {
        ctx.run("square", &geometry::square(self.length as f64))
    }
}

/// `triangle size` for an equilateral triangle, `triangle a,b,c` for any other.
///
/// Triangles are best effort: a malformed argument or impossible sides draw nothing.
pub struct Triangle {
    /// `None` when there is nothing sensible to draw.
    plan: Option<Vec<Step>>,
}

impl Triangle {
    fn plan(rest: &str) -> Option<Vec<Step>> {
        if rest.matches(',').count() == 2 {
            let sides = rest
                .split(',')
                .map(|side| side.trim().parse::<i64>().ok().map(|v| v as f64))
                .collect::<Option<Vec<f64>>>()?;
            geometry::custom_triangle(sides[0], sides[1], sides[2])
        } else {
            let size = rest.parse::<i64>().ok().filter(|size| *size >= 0)?;
            Some(geometry::equilateral_triangle(size as f64))
        }
    }
}

impl BuiltinCommand for Triangle {
    fn names() -> &'static [&'static str] {
        &["triangle"]
    }

    fn parse(tokens: &Tokens) -> Result<Self, CommandError> {
        if tokens.rest.is_empty() {
            return Err(CommandError::MissingArgument {
                command: tokens.command.clone(),
                expected: "size or sides",
            });
        }
        Ok(Triangle {
            plan: Self::plan(&tokens.rest),
        })
    }

    fn execute(self, ctx: &mut Context<'_>) -> Result<Outcome, CommandError> {
        match self.plan {
            Some(steps) => ctx.run("triangle", &steps),
            None => Err(CommandError::DegenerateShape {
                command: "triangle".to_string(),
            }),
        }
    }
}

pub struct SquareSpiral {
    pub turns: i64,
    pub initial_length: i64,
}

impl BuiltinCommand for SquareSpiral {
    fn names() -> &'static [&'static str] {
        &["square_spiral"]
    }

    fn parse(tokens: &Tokens) -> Result<Self, CommandError> {
        let turns = tokens.int_arg(0, "number of turns")?;
        let initial_length = tokens.int_arg(1, "initial length")?;
        if !(0..=MAX_SPIRAL_TURNS).contains(&turns) {
            return Err(tokens.out_of_range(turns, "between 0 and 10000 turns"));
        }
        Ok(SquareSpiral {
            turns,
            initial_length: non_negative(tokens, initial_length)?,
        })
    }

    fn execute(self, ctx: &mut Context<'_>) -> Result<Outcome, CommandError> {
        let steps = geometry::square_spiral(self.turns, self.initial_length);
        ctx.run("square_spiral", &steps)
    }
}

//! Built-in rock-paper-scissors demonstration.
//!
//! Three rules are registered; every other pairing goes through the default,
//! which calls a draw on equal ordinals and otherwise retries with the
//! arguments swapped and the sign flipped. `StrongRock` inherits from `Rock`
//! and only overrides its match against `Paper`.

use gendispatch::{
    Call, ClassHierarchy, ClassId, DispatchError, GenericFunction, HierarchyError, Instance,
    Signature,
};
use serde::Serialize;

use crate::InspectError;

/// A move in the game.
#[derive(Debug, Clone)]
pub struct Move {
    class: ClassId,
    ordinal: u8,
}

impl Instance for Move {
    fn class_id(&self) -> ClassId {
        self.class
    }
}

/// One cell of the outcome table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Outcome {
    pub first: String,
    pub second: String,
    /// 1 if `first` wins, -1 if it loses, 0 on a draw.
    pub result: i32,
    /// The registered key that answered, or `None` when the default ran.
    pub matched: Option<Vec<String>>,
    /// The candidate keys walked for this pairing.
    pub dispatch_info: Vec<Vec<String>>,
}

/// The game's classes and `win` function.
pub struct Game {
    classes: ClassHierarchy,
    moves: Vec<Move>,
    win: GenericFunction<Move, i32>,
}

impl Game {
    /// Define the classes and register the rules.
    pub fn new() -> Result<Self, InspectError> {
        let mut classes = ClassHierarchy::new();
        let (rock, paper, scissors, strong_rock) = define_moves(&mut classes)?;

        let signature = Signature::new("win", ["a", "b"]).dispatch_on(["a", "b"])?;
        let mut win = GenericFunction::new(signature).with_default(symmetric);
        win.register(&classes, &[rock, paper], |_| Ok(-1))?;
        win.register(&classes, &[rock, scissors], |_| Ok(1))?;
        win.register(&classes, &[paper, scissors], |_| Ok(-1))?;
        win.register(&classes, &[strong_rock, paper], |_| Ok(0))?;

        let moves = vec![
            Move { class: rock, ordinal: 0 },
            Move { class: paper, ordinal: 1 },
            Move { class: scissors, ordinal: 2 },
            Move { class: strong_rock, ordinal: 0 },
        ];

        Ok(Self {
            classes,
            moves,
            win,
        })
    }

    /// Play every move against every move.
    pub fn table(&self) -> Result<Vec<Outcome>, InspectError> {
        let mut table = Vec::with_capacity(self.moves.len() * self.moves.len());
        for a in &self.moves {
            for b in &self.moves {
                let types = [a.class, b.class];
                let result = self.win.call(&self.classes, &[a.clone(), b.clone()])?;
                let matched = self
                    .win
                    .resolve(&self.classes, &types)?
                    .key()
                    .map(|key| self.names(key));
                let dispatch_info = self.win.dispatch_info(&self.classes, &types)?;
                table.push(Outcome {
                    first: self.classes.name(a.class).to_string(),
                    second: self.classes.name(b.class).to_string(),
                    result,
                    matched,
                    dispatch_info,
                });
            }
        }
        Ok(table)
    }

    fn names(&self, key: &[ClassId]) -> Vec<String> {
        key.iter().map(|&c| self.classes.name(c).to_string()).collect()
    }
}

fn define_moves(
    classes: &mut ClassHierarchy,
) -> Result<(ClassId, ClassId, ClassId, ClassId), HierarchyError> {
    let rock = classes.define("Rock", &[])?;
    let paper = classes.define("Paper", &[])?;
    let scissors = classes.define("Scissors", &[])?;
    let strong_rock = classes.define("StrongRock", &["Rock"])?;
    Ok((rock, paper, scissors, strong_rock))
}

fn symmetric(call: &Call<'_, Move, i32>) -> Result<i32, DispatchError> {
    let [a, b] = call.args() else {
        return Err(call.not_implemented());
    };
    if a.ordinal == b.ordinal {
        Ok(0)
    } else if a.ordinal > b.ordinal {
        Ok(-call.recurse(&[b.clone(), a.clone()])?)
    } else {
        Err(call.not_implemented())
    }
}

use std::collections::VecDeque;

use crate::models::PerceptionReading;

use super::perception::PerceptionSource;

/// Replays a fixed list of readings, then reports no face forever (or loops).
#[derive(Debug, Clone)]
pub struct ScriptedPerception {
    script: Vec<Option<PerceptionReading>>,
    queue: VecDeque<Option<PerceptionReading>>,
    looping: bool,
}

impl ScriptedPerception {
    pub fn new(script: Vec<Option<PerceptionReading>>) -> Self {
        Self {
            queue: script.iter().cloned().collect(),
            script,
            looping: false,
        }
    }

    pub fn looping(mut self) -> Self {
        self.looping = true;
        self
    }

    pub fn remaining(&self) -> usize {
        self.queue.len()
    }
}

impl PerceptionSource for ScriptedPerception {
    fn sample(&mut self) -> Option<PerceptionReading> {
        if self.queue.is_empty() && self.looping {
            self.queue.extend(self.script.iter().cloned());
        }
        self.queue.pop_front().flatten()
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

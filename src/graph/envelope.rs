use crate::{
    dsp::envelope::Envelope,
    graph::node::{GraphNode, RenderCtx},
};

/// Envelope as a graph node, usually the modulator side of `.amplify()`
pub struct EnvNode {
    env: Envelope,
}

impl EnvNode {
    /// Jump to `start` on trigger, then decay exponentially to `floor` over `ramp_time` seconds.
    pub fn exp_decay(start: f32, floor: f32, ramp_time: f32) -> Self {
        Self {
            env: Envelope::exp_decay(start, floor, ramp_time),
        }
    }

    pub fn level(&self) -> f32 {
        self.env.level()
    }
}

impl GraphNode for EnvNode {
    fn render_block(&mut self, out: &mut [f32], _ctx: &RenderCtx) {
        self.env.render(out);
    }

    fn note_on(&mut self, ctx: &RenderCtx) {
        self.env.note_on(ctx);
    }

    fn note_off(&mut self, _ctx: &RenderCtx) {
        self.env.note_off();
    }

    fn is_active(&self) -> bool {
        self.env.is_active()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_follows_trigger() {
        let ctx = RenderCtx::from_freq(1_000.0, 900.0, 1.0);
        let mut env = EnvNode::exp_decay(0.35, 0.001, 0.1);
        assert_eq!(env.level(), 0.0);
        assert!(!env.is_active());

        env.note_on(&ctx);
        assert_eq!(env.level(), 0.35);

        let mut buffer = vec![0.0f32; 150];
        env.render_block(&mut buffer, &ctx);
        assert!((env.level() - 0.001).abs() < 1e-6);

        env.note_off(&ctx);
        assert_eq!(env.level(), 0.0);
    }
}

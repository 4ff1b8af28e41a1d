use crate::{
    graph::node::{GraphNode, RenderCtx},
    MAX_BLOCK_SIZE,
};

/// Multiply a signal by a modulator, sample by sample (VCA)
pub struct Amplify<N, M> {
    pub signal: N,
    pub modulator: M,
    temp_buffer: Vec<f32>,
}

impl<N, M> Amplify<N, M> {
    pub fn new(signal: N, modulator: M) -> Self {
        Self {
            signal,
            modulator,
            temp_buffer: vec![0.0; MAX_BLOCK_SIZE],
        }
    }
}

impl<N: GraphNode, M: GraphNode> GraphNode for Amplify<N, M> {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        self.signal.render_block(out, ctx);

        // Blocks larger than the scratch buffer are handled in chunks
        for chunk in out.chunks_mut(MAX_BLOCK_SIZE) {
            let frames = &mut self.temp_buffer[..chunk.len()];
            self.modulator.render_block(frames, ctx);

            for (o, m) in chunk.iter_mut().zip(frames.iter()) {
                *o *= *m;
            }
        }
    }

    fn note_on(&mut self, ctx: &RenderCtx) {
        self.signal.note_on(ctx);
        self.modulator.note_on(ctx);
    }

    fn note_off(&mut self, ctx: &RenderCtx) {
        self.signal.note_off(ctx);
        self.modulator.note_off(ctx);
    }

    // Gain is the modulator's job; the signal side never goes quiet on its own
    fn is_active(&self) -> bool {
        self.modulator.is_active()
    }
}

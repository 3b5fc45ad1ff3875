use burn::{
    nn::{
        attention::{
            generate_autoregressive_mask, MhaInput, MultiHeadAttention, MultiHeadAttentionConfig,
        },
        loss::CrossEntropyLossConfig,
        Dropout, DropoutConfig,
        Embedding, EmbeddingConfig,
        LayerNorm, LayerNormConfig,
        Linear, LinearConfig,
    },
    prelude::*,
    tensor::backend::AutodiffBackend,
};

use crate::data::encode::IGNORE_INDEX;

// NOTE: #[derive(Config)] already generates Clone and Serialize/Deserialize
// internally — do NOT add them again or you get conflicting impls.
#[derive(Config, Debug)]
pub struct EncoderDecoderConfig {
    pub vocab_size:         usize,
    pub max_source_len:     usize,
    pub max_target_len:     usize,
    pub d_model:            usize,
    pub num_heads:          usize,
    pub num_encoder_layers: usize,
    pub num_decoder_layers: usize,
    pub d_ff:               usize,
    pub dropout:            f64,
    pub pad_id:             usize,
}

impl EncoderDecoderConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> EncoderDecoderModel<B> {
        // One token embedding shared between encoder and decoder
        // inputs, T5-style; positions get separate tables because
        // source and target lengths differ.
        let token_embedding = EmbeddingConfig::new(self.vocab_size, self.d_model).init(device);
        let source_position = EmbeddingConfig::new(self.max_source_len, self.d_model).init(device);
        let target_position = EmbeddingConfig::new(self.max_target_len, self.d_model).init(device);

        let encoder_layers: Vec<EncoderBlock<B>> = (0..self.num_encoder_layers)
            .map(|_| self.build_encoder_block(device))
            .collect();
        let decoder_layers: Vec<DecoderBlock<B>> = (0..self.num_decoder_layers)
            .map(|_| self.build_decoder_block(device))
            .collect();

        let encoder_norm = LayerNormConfig::new(self.d_model).init(device);
        let decoder_norm = LayerNormConfig::new(self.d_model).init(device);
        let lm_head = LinearConfig::new(self.d_model, self.vocab_size)
            .with_bias(false)
            .init(device);
        let dropout = DropoutConfig::new(self.dropout).init();

        EncoderDecoderModel {
            token_embedding,
            source_position,
            target_position,
            encoder_layers,
            decoder_layers,
            encoder_norm,
            decoder_norm,
            lm_head,
            dropout,
            pad_id:         self.pad_id,
            max_source_len: self.max_source_len,
            max_target_len: self.max_target_len,
        }
    }

    fn build_encoder_block<B: Backend>(&self, device: &B::Device) -> EncoderBlock<B> {
        let self_attn = MultiHeadAttentionConfig::new(self.d_model, self.num_heads)
            .with_dropout(self.dropout)
            .init(device);
        let ffn_linear1 = LinearConfig::new(self.d_model, self.d_ff).init(device);
        let ffn_linear2 = LinearConfig::new(self.d_ff, self.d_model).init(device);
        let norm1   = LayerNormConfig::new(self.d_model).init(device);
        let norm2   = LayerNormConfig::new(self.d_model).init(device);
        let dropout = DropoutConfig::new(self.dropout).init();
        EncoderBlock { self_attn, ffn_linear1, ffn_linear2, norm1, norm2, dropout }
    }

    fn build_decoder_block<B: Backend>(&self, device: &B::Device) -> DecoderBlock<B> {
        let self_attn = MultiHeadAttentionConfig::new(self.d_model, self.num_heads)
            .with_dropout(self.dropout)
            .init(device);
        let cross_attn = MultiHeadAttentionConfig::new(self.d_model, self.num_heads)
            .with_dropout(self.dropout)
            .init(device);
        let ffn_linear1 = LinearConfig::new(self.d_model, self.d_ff).init(device);
        let ffn_linear2 = LinearConfig::new(self.d_ff, self.d_model).init(device);
        let norm1   = LayerNormConfig::new(self.d_model).init(device);
        let norm2   = LayerNormConfig::new(self.d_model).init(device);
        let norm3   = LayerNormConfig::new(self.d_model).init(device);
        let dropout = DropoutConfig::new(self.dropout).init();
        DecoderBlock {
            self_attn, cross_attn, ffn_linear1, ffn_linear2,
            norm1, norm2, norm3, dropout,
        }
    }
}

#[derive(Module, Debug)]
pub struct EncoderBlock<B: Backend> {
    pub self_attn:   MultiHeadAttention<B>,
    pub ffn_linear1: Linear<B>,
    pub ffn_linear2: Linear<B>,
    pub norm1:       LayerNorm<B>,
    pub norm2:       LayerNorm<B>,
    pub dropout:     Dropout,
}

impl<B: Backend> EncoderBlock<B> {
    /// x: [batch, src_len, d_model], pad_mask: true at padding
    pub fn forward(&self, x: Tensor<B, 3>, pad_mask: Tensor<B, 2, Bool>) -> Tensor<B, 3> {
        let attn_output = self
            .self_attn
            .forward(MhaInput::self_attn(x.clone()).mask_pad(pad_mask))
            .context;
        let x = self.norm1.forward(x + self.dropout.forward(attn_output));
        let ffn_out = self.ffn_linear2.forward(
            burn::tensor::activation::gelu(self.ffn_linear1.forward(x.clone())),
        );
        self.norm2.forward(x + self.dropout.forward(ffn_out))
    }
}

#[derive(Module, Debug)]
pub struct DecoderBlock<B: Backend> {
    pub self_attn:   MultiHeadAttention<B>,
    pub cross_attn:  MultiHeadAttention<B>,
    pub ffn_linear1: Linear<B>,
    pub ffn_linear2: Linear<B>,
    pub norm1:       LayerNorm<B>,
    pub norm2:       LayerNorm<B>,
    pub norm3:       LayerNorm<B>,
    pub dropout:     Dropout,
}

impl<B: Backend> DecoderBlock<B> {
    /// x: [batch, tgt_len, d_model], memory: encoder output,
    /// causal_mask: upper-triangular, memory_pad: true at source padding
    pub fn forward(
        &self,
        x:           Tensor<B, 3>,
        memory:      Tensor<B, 3>,
        causal_mask: Tensor<B, 3, Bool>,
        memory_pad:  Tensor<B, 2, Bool>,
    ) -> Tensor<B, 3> {
        // Causal self-attention: each position sees only itself
        // and earlier target positions.
        let self_out = self
            .self_attn
            .forward(MhaInput::self_attn(x.clone()).mask_attn(causal_mask))
            .context;
        let x = self.norm1.forward(x + self.dropout.forward(self_out));

        // Cross-attention: target queries over the full encoder
        // output, with source padding masked out.
        let cross_out = self
            .cross_attn
            .forward(
                MhaInput::new(x.clone(), memory.clone(), memory).mask_pad(memory_pad),
            )
            .context;
        let x = self.norm2.forward(x + self.dropout.forward(cross_out));

        let ffn_out = self.ffn_linear2.forward(
            burn::tensor::activation::gelu(self.ffn_linear1.forward(x.clone())),
        );
        self.norm3.forward(x + self.dropout.forward(ffn_out))
    }
}

#[derive(Module, Debug)]
pub struct EncoderDecoderModel<B: Backend> {
    pub token_embedding: Embedding<B>,
    pub source_position: Embedding<B>,
    pub target_position: Embedding<B>,
    pub encoder_layers:  Vec<EncoderBlock<B>>,
    pub decoder_layers:  Vec<DecoderBlock<B>>,
    pub encoder_norm:    LayerNorm<B>,
    pub decoder_norm:    LayerNorm<B>,
    pub lm_head:         Linear<B>,
    pub dropout:         Dropout,
    pub pad_id:          usize,
    pub max_source_len:  usize,
    pub max_target_len:  usize,
}

impl<B: Backend> EncoderDecoderModel<B> {
    /// Encode the source sequence.
    /// input_ids, attention_mask: [batch, src_len] → [batch, src_len, d_model]
    pub fn encode(
        &self,
        input_ids:      Tensor<B, 2, Int>,
        attention_mask: Tensor<B, 2, Int>,
    ) -> Tensor<B, 3> {
        let [batch_size, src_len] = input_ids.dims();
        let pad_mask = attention_mask.equal_elem(0);

        let tok_emb = self.token_embedding.forward(input_ids);

        // Self-attention is permutation-invariant, so position must be injected explicitly.
        let positions = Tensor::<B, 1, Int>::arange(0..src_len as i64, &tok_emb.device())
            .unsqueeze::<2>()
            .expand([batch_size, src_len]);
        let pos_emb = self.source_position.forward(positions);

        let mut x = self.dropout.forward(tok_emb + pos_emb);
        for layer in &self.encoder_layers {
            x = layer.forward(x, pad_mask.clone());
        }
        self.encoder_norm.forward(x)
    }

    /// Run the decoder over a target prefix against encoded memory.
    /// Returns next-token logits: [batch, tgt_len, vocab]
    pub fn decode(
        &self,
        target_ids: Tensor<B, 2, Int>,
        memory:     Tensor<B, 3>,
        memory_pad: Tensor<B, 2, Bool>,
    ) -> Tensor<B, 3> {
        let [batch_size, tgt_len] = target_ids.dims();
        let device = memory.device();
        let causal_mask = generate_autoregressive_mask::<B>(batch_size, tgt_len, &device);

        let tok_emb = self.token_embedding.forward(target_ids);
        let positions = Tensor::<B, 1, Int>::arange(0..tgt_len as i64, &device)
            .unsqueeze::<2>()
            .expand([batch_size, tgt_len]);
        let pos_emb = self.target_position.forward(positions);

        let mut x = self.dropout.forward(tok_emb + pos_emb);
        for layer in &self.decoder_layers {
            x = layer.forward(x, memory.clone(), causal_mask.clone(), memory_pad.clone());
        }
        let x = self.decoder_norm.forward(x);
        self.lm_head.forward(x)
    }

    /// Full teacher-forced forward pass.
    pub fn forward(
        &self,
        input_ids:      Tensor<B, 2, Int>,
        attention_mask: Tensor<B, 2, Int>,
        target_ids:     Tensor<B, 2, Int>,
    ) -> Tensor<B, 3> {
        let memory_pad = attention_mask.clone().equal_elem(0);
        let memory = self.encode(input_ids, attention_mask);
        self.decode(target_ids, memory, memory_pad)
    }

    /// Teacher-forced cross-entropy loss over one batch.
    ///
    /// Labels carry the ignore sentinel at pad positions; those
    /// positions are excluded from the loss. The decoder input is
    /// the label sequence shifted right with the pad token as the
    /// start symbol (T5 convention).
    pub fn forward_loss(
        &self,
        input_ids:      Tensor<B, 2, Int>,
        attention_mask: Tensor<B, 2, Int>,
        labels:         Tensor<B, 2, Int>,
    ) -> Tensor<B, 1>
    where
        B: AutodiffBackend,
    {
        let [batch_size, tgt_len] = labels.dims();
        let device = labels.device();

        // sentinel → pad, both for teacher forcing and as the CE
        // target; the CE config then masks pad targets out.
        let ignore = labels.clone().equal_elem(IGNORE_INDEX);
        let padded = labels.mask_fill(ignore, self.pad_id as i32);

        let start = Tensor::<B, 2, Int>::full([batch_size, 1], self.pad_id as i32, &device);
        let shifted = Tensor::cat(
            vec![start, padded.clone().slice([0..batch_size, 0..tgt_len - 1])],
            1,
        );

        let logits = self.forward(input_ids, attention_mask, shifted);
        let [_, _, vocab] = logits.dims();

        let ce = CrossEntropyLossConfig::new()
            .with_pad_tokens(Some(vec![self.pad_id]))
            .init(&device);
        ce.forward(
            logits.reshape([batch_size * tgt_len, vocab]),
            padded.reshape([batch_size * tgt_len]),
        )
    }
}

//! PCM 缓冲与格式对齐

/// 交错排列的 16-bit PCM
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PcmBuffer {
    pub samples: Vec<i16>,
    pub sample_rate: u32,
    pub channels: u16,
}

impl PcmBuffer {
    pub fn frames(&self) -> usize {
        if self.channels == 0 {
            0
        } else {
            self.samples.len() / self.channels as usize
        }
    }

    pub fn duration_ms(&self) -> u64 {
        if self.sample_rate == 0 {
            return 0;
        }
        self.frames() as u64 * 1000 / self.sample_rate as u64
    }

    /// 转换到目标采样率与声道数
    pub fn conform(self, sample_rate: u32, channels: u16) -> Self {
        self.remix(channels).resample(sample_rate)
    }

    /// 线性插值重采样
    pub fn resample(self, to_rate: u32) -> Self {
        if self.sample_rate == to_rate || self.sample_rate == 0 || self.samples.is_empty() {
            return Self {
                sample_rate: to_rate,
                ..self
            };
        }

        let ratio = to_rate as f64 / self.sample_rate as f64;
        let channel_count = self.channels as usize;
        let frame_count = self.frames();
        let new_frame_count = (frame_count as f64 * ratio) as usize;
        let mut resampled = Vec::with_capacity(new_frame_count * channel_count);

        for i in 0..new_frame_count {
            let src_pos = i as f64 / ratio;
            let src_idx = src_pos as usize;
            let frac = src_pos - src_idx as f64;

            for ch in 0..channel_count {
                let idx0 = src_idx * channel_count + ch;
                let idx1 = (src_idx + 1).min(frame_count - 1) * channel_count + ch;

                let s0 = self.samples.get(idx0).copied().unwrap_or(0) as f64;
                let s1 = self.samples.get(idx1).copied().map(f64::from).unwrap_or(s0);
                resampled.push((s0 + (s1 - s0) * frac).round() as i16);
            }
        }

        Self {
            samples: resampled,
            sample_rate: to_rate,
            channels: self.channels,
        }
    }

    /// 声道转换：多声道取平均下混，单声道复制上混
    pub fn remix(self, to_channels: u16) -> Self {
        if self.channels == to_channels || self.channels == 0 || to_channels == 0 {
            return self;
        }

        let from = self.channels as usize;
        let to = to_channels as usize;
        let mut out = Vec::with_capacity(self.frames() * to);

        for frame in self.samples.chunks_exact(from) {
            if from == 1 {
                out.extend(std::iter::repeat(frame[0]).take(to));
            } else {
                let sum: i32 = frame.iter().map(|&s| s as i32).sum();
                let mono = (sum / from as i32) as i16;
                out.extend(std::iter::repeat(mono).take(to));
            }
        }

        Self {
            samples: out,
            sample_rate: self.sample_rate,
            channels: to_channels,
        }
    }

    /// 按顺序拼接，后续片段对齐到第一个片段的格式
    pub fn concat(segments: Vec<PcmBuffer>) -> Option<PcmBuffer> {
        let mut iter = segments.into_iter();
        let mut joined = iter.next()?;

        for segment in iter {
            let segment = segment.conform(joined.sample_rate, joined.channels);
            joined.samples.extend(segment.samples);
        }

        Some(joined)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mono(samples: Vec<i16>, rate: u32) -> PcmBuffer {
        PcmBuffer {
            samples,
            sample_rate: rate,
            channels: 1,
        }
    }

    #[test]
    fn test_duration() {
        assert_eq!(mono(vec![0; 16000], 16000).duration_ms(), 1000);
        assert_eq!(
            PcmBuffer {
                samples: vec![0; 4410],
                sample_rate: 22050,
                channels: 2
            }
            .duration_ms(),
            100
        );
    }

    #[test]
    fn test_resample_doubles_frames() {
        let out = mono(vec![0, 100, 200, 300], 8000).resample(16000);
        assert_eq!(out.sample_rate, 16000);
        assert_eq!(out.samples.len(), 8);
        assert_eq!(out.samples[0], 0);
        assert_eq!(out.samples[1], 50);
        assert_eq!(out.samples[2], 100);
    }

    #[test]
    fn test_remix_up_and_down() {
        let stereo = mono(vec![10, -10], 16000).remix(2);
        assert_eq!(stereo.samples, vec![10, 10, -10, -10]);

        let back = PcmBuffer {
            samples: vec![10, 30, -10, -30],
            sample_rate: 16000,
            channels: 2,
        }
        .remix(1);
        assert_eq!(back.samples, vec![20, -20]);
    }

    #[test]
    fn test_concat_conforms_to_first_segment() {
        let joined = PcmBuffer::concat(vec![
            mono(vec![1, 2], 8000),
            mono(vec![3, 3, 3, 3], 16000),
        ])
        .unwrap();
        assert_eq!(joined.sample_rate, 8000);
        assert_eq!(joined.samples, vec![1, 2, 3, 3]);

        assert!(PcmBuffer::concat(Vec::new()).is_none());
    }
}

use crate::types::ParticleField;

/// One particle ready to be written into the field buffers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    pub position: [f32; 3],
    pub color: [f32; 3],
    pub size: f32,
}

/// Fixed-capacity particle storage with a single append-or-reject operation.
///
/// Capacity is decided up front by the sampler's estimate; once it is reached
/// every further `push` is rejected and the sampler stops walking the image.
#[derive(Debug)]
pub struct ParticleArena {
    capacity: usize,
    positions: Vec<f32>,
    colors: Vec<f32>,
    sizes: Vec<f32>,
}

impl ParticleArena {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            positions: Vec::with_capacity(capacity * 3),
            colors: Vec::with_capacity(capacity * 3),
            sizes: Vec::with_capacity(capacity),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.sizes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sizes.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.len() >= self.capacity
    }

    /// Append a particle. Returns `false`, leaving the arena untouched, when
    /// it is already full.
    pub fn push(&mut self, particle: Particle) -> bool {
        if self.is_full() {
            return false;
        }
        self.positions.extend_from_slice(&particle.position);
        self.colors.extend_from_slice(&particle.color);
        self.sizes.push(particle.size);
        true
    }

    /// Freeze into a field truncated to the written count.
    pub fn into_field(self, canvas_width: u32, canvas_height: u32, scale: f32) -> ParticleField {
        ParticleField {
            count: self.sizes.len(),
            positions: self.positions,
            colors: self.colors,
            sizes: self.sizes,
            canvas_width,
            canvas_height,
            scale,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn particle(x: f32) -> Particle {
        Particle { position: [x, 0.0, 0.0], color: [1.0, 0.5, 0.0], size: 1.0 }
    }

    #[test]
    fn test_push_rejects_when_full() {
        let mut arena = ParticleArena::with_capacity(2);
        assert!(arena.push(particle(0.0)));
        assert!(arena.push(particle(1.0)));
        assert!(arena.is_full());
        assert!(!arena.push(particle(2.0)));
        assert_eq!(arena.len(), 2);
    }

    #[test]
    fn test_into_field_keeps_lengths_consistent() {
        let mut arena = ParticleArena::with_capacity(10);
        arena.push(particle(3.0));
        let field = arena.into_field(4, 4, 1.0);
        assert_eq!(field.count, 1);
        assert_eq!(field.positions.len(), 3);
        assert_eq!(field.colors.len(), 3);
        assert_eq!(field.sizes.len(), 1);
        assert_eq!(field.position(0), [3.0, 0.0, 0.0]);
        assert_eq!(field.color(0), [1.0, 0.5, 0.0]);
    }
}

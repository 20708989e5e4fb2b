//! Growable GPU vertex buffers.
//!
//! Point buffers are rewritten whenever the highlight changes. The buffer
//! grows with a 2x strategy when the data outgrows it and never shrinks
//! (GPU buffers cannot be resized in place).

use wgpu::util::DeviceExt;

use crate::picking::PointVertex;

/// Smallest allocation, so empty datasets still get a valid buffer.
const MIN_CAPACITY: usize = size_of::<PointVertex>();

/// A vertex buffer of [`PointVertex`] instances that grows on demand.
pub struct DynamicBuffer {
    buffer: wgpu::Buffer,
    capacity: usize, // bytes
    len: usize,      // points
    label: String,
}

impl DynamicBuffer {
    /// Buffer initialized from `vertices`.
    pub fn new_with_data(
        device: &wgpu::Device,
        label: &str,
        vertices: &[PointVertex],
    ) -> Self {
        let bytes: &[u8] = bytemuck::cast_slice(vertices);
        let buffer = if bytes.is_empty() {
            device.create_buffer(&wgpu::BufferDescriptor {
                label: Some(label),
                size: MIN_CAPACITY as u64,
                usage: wgpu::BufferUsages::VERTEX
                    | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            })
        } else {
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(label),
                contents: bytes,
                usage: wgpu::BufferUsages::VERTEX
                    | wgpu::BufferUsages::COPY_DST,
            })
        };

        Self {
            buffer,
            capacity: bytes.len().max(MIN_CAPACITY),
            len: vertices.len(),
            label: label.to_owned(),
        }
    }

    /// Replace the contents, growing if necessary.
    ///
    /// Returns `true` if the buffer was reallocated.
    pub fn write(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        vertices: &[PointVertex],
    ) -> bool {
        let bytes: &[u8] = bytemuck::cast_slice(vertices);
        let needed = bytes.len();

        let reallocated = if needed > self.capacity {
            let new_capacity = (needed * 2).max(self.capacity + 1024);
            self.buffer = device.create_buffer(&wgpu::BufferDescriptor {
                label: Some(&self.label),
                size: new_capacity as u64,
                usage: wgpu::BufferUsages::VERTEX
                    | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            });
            self.capacity = new_capacity;
            true
        } else {
            false
        };

        if needed > 0 {
            queue.write_buffer(&self.buffer, 0, bytes);
        }
        self.len = vertices.len();
        reallocated
    }

    /// The underlying wgpu buffer.
    pub fn buffer(&self) -> &wgpu::Buffer {
        &self.buffer
    }

    /// Number of points currently stored.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the buffer holds no points.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

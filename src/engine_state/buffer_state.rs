//! # Buffer State Module
//!
//! A registry of named GPU buffers used by the voxel renderer.
//!
//! ## Key Features
//!
//! * Buffers are referenced by a static name
//! * Writes are bounds checked and reported as `RenderError`
//! * Buffers whose contents grow are reallocated on demand
//! * Allocated memory per buffer and in total
//!
//! The registry does not own the device or queue; callers pass them in, so it
//! can live next to them in the renderer without shared ownership.

use std::collections::HashMap;

use wgpu::{util::DeviceExt, Buffer, BufferUsages, Device, Queue};

use crate::error::RenderError;

/// Allocation record of one buffer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct BufferAnalytics {
    /// Total memory allocated for the buffer in bytes
    allocated_memory: u64,
}

impl BufferAnalytics {
    fn allocated(size: u64) -> Self {
        Self {
            allocated_memory: size,
        }
    }

    fn check_write(&self, buffer: &'static str, offset: u64, len: u64) -> Result<(), RenderError> {
        match offset.checked_add(len) {
            Some(end) if end <= self.allocated_memory => Ok(()),
            _ => Err(RenderError::OutOfBounds {
                buffer,
                offset,
                len,
                size: self.allocated_memory,
            }),
        }
    }
}

/// Named GPU buffers and their allocation sizes.
#[derive(Default)]
pub struct BufferState {
    buffers: HashMap<&'static str, Buffer>,
    buffer_analytics: HashMap<&'static str, BufferAnalytics>,
}

impl BufferState {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an uninitialized buffer, replacing any buffer of the same name.
    pub fn create_buffer(
        &mut self,
        device: &Device,
        buffer_name: &'static str,
        size: u64,
        usage: BufferUsages,
    ) {
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(buffer_name),
            size,
            usage,
            mapped_at_creation: false,
        });

        self.buffers.insert(buffer_name, buffer);
        self.buffer_analytics
            .insert(buffer_name, BufferAnalytics::allocated(size));
    }

    /// Creates a buffer holding `contents`, replacing any buffer of the same
    /// name.
    pub fn create_buffer_init(
        &mut self,
        device: &Device,
        buffer_name: &'static str,
        contents: &[u8],
        usage: BufferUsages,
    ) {
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(buffer_name),
            contents,
            usage,
        });

        self.buffers.insert(buffer_name, buffer);
        self.buffer_analytics
            .insert(buffer_name, BufferAnalytics::allocated(contents.len() as u64));
    }

    /// Makes sure `buffer_name` can hold at least `size` bytes.
    ///
    /// A missing or smaller buffer is replaced by one of the next power of two
    /// size; the old contents are lost. Returns whether a new buffer was
    /// created.
    pub fn ensure_capacity(
        &mut self,
        device: &Device,
        buffer_name: &'static str,
        size: u64,
        usage: BufferUsages,
    ) -> bool {
        let current = self
            .buffer_analytics
            .get(buffer_name)
            .map(|analytics| analytics.allocated_memory);

        match grown_size(current, size) {
            Some(new_size) => {
                log::debug!("Allocating {new_size} bytes for buffer `{buffer_name}`");
                self.create_buffer(device, buffer_name, new_size, usage);
                true
            }
            None => false,
        }
    }

    /// Writes raw bytes into a buffer through `queue`.
    pub fn write_buffer(
        &self,
        queue: &Queue,
        buffer_name: &'static str,
        offset: wgpu::BufferAddress,
        data: &[u8],
    ) -> Result<(), RenderError> {
        let buffer = self
            .buffers
            .get(buffer_name)
            .ok_or(RenderError::MissingBuffer(buffer_name))?;
        let analytics = self
            .buffer_analytics
            .get(buffer_name)
            .ok_or(RenderError::MissingBuffer(buffer_name))?;

        analytics.check_write(buffer_name, offset, data.len() as u64)?;

        queue.write_buffer(buffer, offset, data);
        Ok(())
    }

    /// Gets a buffer by name.
    pub fn get_buffer(&self, buffer_name: &'static str) -> Result<&Buffer, RenderError> {
        self.buffers
            .get(buffer_name)
            .ok_or(RenderError::MissingBuffer(buffer_name))
    }

    /// Gets a binding resource for the entire buffer.
    pub fn get_entire_binding(
        &self,
        buffer_name: &'static str,
    ) -> Result<wgpu::BindingResource<'_>, RenderError> {
        Ok(self.get_buffer(buffer_name)?.as_entire_binding())
    }

    /// Total allocated memory across all buffers, in bytes.
    pub fn get_total_allocated_memory(&self) -> u64 {
        self.buffer_analytics
            .values()
            .map(|analytics| analytics.allocated_memory)
            .sum()
    }
}

/// Size to reallocate to when `requested` bytes do not fit in `current`.
fn grown_size(current: Option<u64>, requested: u64) -> Option<u64> {
    match current {
        Some(allocated) if allocated >= requested => None,
        _ => Some(requested.max(1).next_power_of_two()),
    }
}

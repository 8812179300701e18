//! Unbounded FIFO of captured frames shared by the tick thread and the encoder worker.

use crate::types::CapturedFrame;
use crossbeam_channel::{Receiver, Sender};

/// Message carried by the frame queue.
#[derive(Debug)]
pub enum QueueMessage {
    /// A captured RGBA frame.
    Frame(CapturedFrame),
    /// No more frames will follow; the worker exits once it reaches this.
    EndOfStream,
}

/// Producer half. Appends frames in capture order.
#[derive(Debug, Clone)]
pub struct FrameQueue {
    sender: Sender<QueueMessage>,
}

/// Consumer half. Pops frames in the order they were pushed.
#[derive(Debug)]
pub struct FrameQueueReader {
    receiver: Receiver<QueueMessage>,
}

/// Creates a connected producer/consumer pair.
///
/// The queue has no capacity bound: a slow encoder grows memory instead of
/// dropping frames.
pub fn frame_queue() -> (FrameQueue, FrameQueueReader) {
    let (sender, receiver) = crossbeam_channel::unbounded();
    (FrameQueue { sender }, FrameQueueReader { receiver })
}

impl FrameQueue {
    /// Appends a frame. Returns false if the reader is gone.
    pub fn push(&self, frame: CapturedFrame) -> bool {
        self.sender.send(QueueMessage::Frame(frame)).is_ok()
    }

    /// Marks the end of the stream. Frames pushed earlier are still delivered.
    pub fn finish(&self) -> bool {
        self.sender.send(QueueMessage::EndOfStream).is_ok()
    }

    /// Number of messages waiting to be consumed.
    pub fn len(&self) -> usize {
        self.sender.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sender.is_empty()
    }
}

impl FrameQueueReader {
    /// Blocks until the next message is available.
    ///
    /// Returns `None` once every producer has been dropped and the queue is empty.
    pub fn pop(&self) -> Option<QueueMessage> {
        self.receiver.recv().ok()
    }

    /// Discards anything still queued, returning how many messages were dropped.
    pub fn clear(&self) -> usize {
        self.receiver.try_iter().count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(index: u32) -> CapturedFrame {
        CapturedFrame {
            index,
            data: vec![index as u8; 4],
        }
    }

    #[test]
    fn test_pop_order_matches_push_order() {
        let (queue, reader) = frame_queue();
        for i in 0..5 {
            assert!(queue.push(frame(i)));
        }
        assert_eq!(queue.len(), 5);

        for i in 0..5 {
            match reader.pop() {
                Some(QueueMessage::Frame(f)) => assert_eq!(f.index, i),
                other => panic!("Expected frame {}, got {:?}", i, other),
            }
        }
        assert!(queue.is_empty());
    }

    #[test]
    fn test_end_of_stream_arrives_after_pending_frames() {
        let (queue, reader) = frame_queue();
        queue.push(frame(0));
        queue.push(frame(1));
        queue.finish();

        assert!(matches!(reader.pop(), Some(QueueMessage::Frame(_))));
        assert!(matches!(reader.pop(), Some(QueueMessage::Frame(_))));
        assert!(matches!(reader.pop(), Some(QueueMessage::EndOfStream)));
    }

    #[test]
    fn test_pop_returns_none_when_producer_dropped() {
        let (queue, reader) = frame_queue();
        queue.push(frame(7));
        drop(queue);

        assert!(matches!(reader.pop(), Some(QueueMessage::Frame(f)) if f.index == 7));
        assert!(reader.pop().is_none());
    }

    #[test]
    fn test_push_fails_without_reader() {
        let (queue, reader) = frame_queue();
        drop(reader);
        assert!(!queue.push(frame(0)));
        assert!(!queue.finish());
    }

    #[test]
    fn test_cross_thread_fifo() {
        let (queue, reader) = frame_queue();

        let consumer = std::thread::spawn(move || {
            let mut seen = Vec::new();
            while let Some(QueueMessage::Frame(f)) = reader.pop() {
                seen.push(f.index);
            }
            seen
        });

        for i in 0..200 {
            queue.push(frame(i));
        }
        queue.finish();

        let seen = consumer.join().unwrap();
        assert_eq!(seen, (0..200).collect::<Vec<_>>());
    }

    #[test]
    fn test_clear_drops_pending() {
        let (queue, reader) = frame_queue();
        queue.push(frame(0));
        queue.push(frame(1));
        assert_eq!(reader.clear(), 2);
        assert!(queue.is_empty());
    }
}

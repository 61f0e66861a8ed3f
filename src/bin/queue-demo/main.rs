use std::sync::Arc;
use std::thread;
use std::time::Duration;

use clap::Parser;
use tracing::info;
use tracing_subscriber;

use blocking_queue::{BlockingQueue, CountdownLatch, Result};

struct Msg {
    contents: String,
}

impl Msg {
    fn new(contents: &str) -> Msg {
        Msg {
            contents: contents.to_string(),
        }
    }
}

impl Clone for Msg {
    fn clone(&self) -> Msg {
        info!("copied Msg");
        Msg {
            contents: self.contents.clone(),
        }
    }
}

fn consume(queue: Arc<BlockingQueue<String>>, started: CountdownLatch, delay: Duration, sentinel: String) {
    started.countdown();
    loop {
        let msg = queue.dequeue();
        info!("thread deQed {}", msg);
        thread::sleep(delay);
        if msg == sentinel {
            break;
        }
    }
}

fn single_message() {
    info!("-- test enQ and deQ operations --");
    let queue = BlockingQueue::new();
    let msg = Msg::new("a message");
    info!("enqueuing \"{}\"", msg.contents);
    // the clone is reported; handing `msg` over directly would not copy
    queue.enqueue(msg.clone());
    let dequeued = queue.dequeue();
    info!("dequeued \"{}\"", dequeued.contents);
}

fn messaging(queue: &Arc<BlockingQueue<String>>, options: &Options) -> Result<()> {
    info!("-- test inter-thread messaging --");
    let started = CountdownLatch::new(1);
    let consumer = {
        let queue = queue.clone();
        let started = started.clone();
        let delay = Duration::from_millis(options.consumer_delay);
        let sentinel = options.sentinel.clone();
        thread::spawn(move || consume(queue, started, delay, sentinel))
    };
    started.wait();

    for i in 0..options.messages {
        let msg = format!("msg#{}", i);
        info!("main enQing {}", msg);
        queue.enqueue(msg);
        thread::sleep(Duration::from_millis(options.producer_delay));
    }
    queue.enqueue(options.sentinel.clone());

    consumer.join().map_err(|_| "consumer thread panicked")?;
    Ok(())
}

fn move_construction(queue: &BlockingQueue<String>) -> Result<()> {
    info!("-- move construction of BlockingQueue --");
    queue.enqueue("test".to_string());
    info!("before move: q.size() = {} q.front() = {}", queue.size(), queue.front()?);
    let q2 = BlockingQueue::take_from(queue);
    info!("after move: q2.size() = {} q.size() = {}", q2.size(), queue.size());
    info!("q2 element = {}", q2.dequeue());
    Ok(())
}

fn move_assignment(queue: &BlockingQueue<String>) -> Result<()> {
    info!("-- move assigning state of BlockingQueue --");
    let q3 = BlockingQueue::new();
    queue.enqueue("test".to_string());
    info!("before move: q.size() = {} q.front() = {}", queue.size(), queue.front()?);
    q3.move_from(queue);
    info!("after move: q.size() = {} q3.size() = {}", queue.size(), q3.size());
    info!("q3 element = {}", q3.dequeue());
    Ok(())
}

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Options {
    /// number of messages sent to the consumer thread
    #[clap(short, long)]
    #[clap(default_value_t = 15)]
    messages: usize,

    /// pause after each enqueue, in milliseconds
    #[clap(short, long)]
    #[clap(default_value_t = 3)]
    producer_delay: u64,

    /// pause after each dequeue, in milliseconds
    #[clap(short, long)]
    #[clap(default_value_t = 10)]
    consumer_delay: u64,

    /// message that stops the consumer thread
    #[clap(short, long)]
    #[clap(default_value_t = String::from("quit"))]
    sentinel: String,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let options = Options::parse();
    info!("Demonstrating blocking queue {:?}", options);

    single_message();

    let queue = Arc::new(BlockingQueue::new());
    messaging(&queue, &options)?;
    move_construction(&queue)?;
    move_assignment(&queue)?;

    Ok(())
}

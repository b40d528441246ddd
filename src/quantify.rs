/*!

Helpers to track the memory usage of the simulation.

The `total_memory` of a value accounts both its stack size and the heap it owns. Shared ownership (`Rc`) is accounted only for its pointer size; whoever logically owns the pointee should add it apart, as done for the packets alive in the network.

*/

use std::mem::size_of;
use std::rc::Rc;
use std::cell::RefCell;
use std::collections::VecDeque;

///Trait for types tracking their memory use.
pub trait Quantifiable
{
	///Get the total memory currently being employed by the implementing type. Both stack and heap.
	fn total_memory(&self) -> usize;
	///Prints by stdout how much memory is used per component.
	fn print_memory_breakdown(&self);
	///Get an estimation on how much memory the type could reach during the simulation.
	fn forecast_total_memory(&self) -> usize;
}

macro_rules! quantify_plain{
	($t:ty) => {
		impl Quantifiable for $t
		{
			fn total_memory(&self) -> usize
			{
				size_of::<$t>()
			}
			fn print_memory_breakdown(&self)
			{
				println!("{} : {}",stringify!($t),size_of::<$t>());
			}
			fn forecast_total_memory(&self) -> usize
			{
				size_of::<$t>()
			}
		}
	};
}

quantify_plain!(bool);
quantify_plain!(u8);
quantify_plain!(u32);
quantify_plain!(u64);
quantify_plain!(i32);
quantify_plain!(usize);
quantify_plain!(f64);

impl Quantifiable for String
{
	fn total_memory(&self) -> usize
	{
		size_of::<String>() + self.capacity()
	}
	fn print_memory_breakdown(&self)
	{
		unimplemented!();
	}
	fn forecast_total_memory(&self) -> usize
	{
		unimplemented!();
	}
}

impl<T:Quantifiable> Quantifiable for Vec<T>
{
	fn total_memory(&self) -> usize
	{
		let mut total=size_of::<Vec<T>>() + (self.capacity()-self.len())*size_of::<T>();
		for element in self.iter()
		{
			total+=element.total_memory();
		}
		total
	}
	fn print_memory_breakdown(&self)
	{
		unimplemented!();
	}
	fn forecast_total_memory(&self) -> usize
	{
		unimplemented!();
	}
}

impl<T:Quantifiable> Quantifiable for VecDeque<T>
{
	fn total_memory(&self) -> usize
	{
		//We add +1 because of one hole in the implementation of VecDeque.
		let mut total=size_of::<VecDeque<T>>() + (self.capacity()+1-self.len())*size_of::<T>();
		for element in self.iter()
		{
			total+=element.total_memory();
		}
		total
	}
	fn print_memory_breakdown(&self)
	{
		unimplemented!();
	}
	fn forecast_total_memory(&self) -> usize
	{
		unimplemented!();
	}
}

impl<T:Quantifiable> Quantifiable for Option<T>
{
	fn total_memory(&self) -> usize
	{
		match self
		{
			Some(ref value) => size_of::<Option<T>>() - size_of::<T>() + value.total_memory(),
			None => size_of::<Option<T>>(),
		}
	}
	fn print_memory_breakdown(&self)
	{
		unimplemented!();
	}
	fn forecast_total_memory(&self) -> usize
	{
		unimplemented!();
	}
}

impl<A:Quantifiable,B:Quantifiable> Quantifiable for (A,B)
{
	fn total_memory(&self) -> usize
	{
		self.0.total_memory()+self.1.total_memory()
	}
	fn print_memory_breakdown(&self)
	{
		unimplemented!();
	}
	fn forecast_total_memory(&self) -> usize
	{
		unimplemented!();
	}
}

impl<T> Quantifiable for Rc<T>
{
	fn total_memory(&self) -> usize
	{
		size_of::<Rc<T>>()
	}
	fn print_memory_breakdown(&self)
	{
		unimplemented!();
	}
	fn forecast_total_memory(&self) -> usize
	{
		unimplemented!();
	}
}

impl<T:Quantifiable> Quantifiable for RefCell<T>
{
	fn total_memory(&self) -> usize
	{
		size_of::<RefCell<T>>() - size_of::<T>() + self.borrow().total_memory()
	}
	fn print_memory_breakdown(&self)
	{
		unimplemented!();
	}
	fn forecast_total_memory(&self) -> usize
	{
		unimplemented!();
	}
}

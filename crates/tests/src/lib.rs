

#[cfg(test)]
mod identification_tests;






#[cfg(test)]
mod ersed_tests;




#[cfg(test)]
mod extraction_tests;


#[cfg(test)]
mod config_tests;

#[cfg(test)]
mod booking_tests;
